mod dns_reply;
mod response_buffer;

pub use dns_reply::reply_with_code;
pub use response_buffer::ResponseBuffer;
