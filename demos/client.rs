//! You can use this example by executing `python3 -m xmlrpc.server` and then running
//! `cargo run --example client`.

use xmlrpc_client::{Client, Value};

fn main() {
    let client = Client::new("http://127.0.0.1:8000");

    // The Python example server exports Python's `pow` method. Let's call it!
    let reply = client.call("pow", &[Value::from(2), Value::from(8)]);    // Compute 2**8

    println!("Result: {:?}", reply);

    // The `.unwrap()` asserts that the request was sent and decoded successfully, `into_result`
    // asserts that the server didn't respond with an error response ("fault").
    let reply = reply.unwrap();
    println!("Sent: {}", reply.request);

    let results = reply.into_result().unwrap();
    assert_eq!(results, vec![Value::Int(2i64.pow(8))]);
}
