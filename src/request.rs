use crate::config::ClientOptions;

// Function used for client connection, building the HTTP upgrade request that
// carries the Sec-WebSocket-Key plus the version and origin taken from the
// client options. Everything ends up as bytes on the TCP stream anyway, so the
// request is assembled as a plain string rather than going through an HTTP
// request type.
pub fn build_upgrade_request(host: &str, key: &str, options: &ClientOptions) -> String {
    format!(
        "GET / HTTP/1.1\r\n\
         Host: {}:{}\r\n\
         Connection: Upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Key: {}\r\n\
         Sec-WebSocket-Version: {}\r\n\
         Origin: {}\r\n\
         \r\n",
        host, options.port, key, options.protocol_version, options.origin,
    )
}

pub trait RequestExt {
    fn get_header_value(&self, header_name: &str) -> Option<String>;
}

impl<'a, 'b> RequestExt for httparse::Request<'a, 'b> {
    fn get_header_value(&self, header_name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(header_name))
            .map(|header| String::from_utf8_lossy(header.value).to_string())
    }
}
