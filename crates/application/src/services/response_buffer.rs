use crate::ports::ResponseWriter;
use async_trait::async_trait;
use ferrous_relay_domain::DomainError;
use hickory_proto::op::Message;

/// In-memory writer handed to an inner handler so a middleware can look at
/// the response before passing it on. Accepts exactly one message; any
/// further write fails with `ResponseAlreadyWritten`.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    message: Option<Message>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_written(&self) -> bool {
        self.message.is_some()
    }

    pub fn into_message(self) -> Option<Message> {
        self.message
    }
}

#[async_trait]
impl ResponseWriter for ResponseBuffer {
    async fn write_msg(&mut self, message: Message) -> Result<(), DomainError> {
        if self.message.is_some() {
            return Err(DomainError::ResponseAlreadyWritten);
        }
        self.message = Some(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_buffer_captures_first_write() {
        let mut buffer = ResponseBuffer::new();
        assert!(!buffer.is_written());

        let mut message = Message::new();
        message.set_id(7);
        buffer.write_msg(message).await.unwrap();

        assert!(buffer.is_written());
        assert_eq!(buffer.into_message().map(|m| m.id()), Some(7));
    }

    #[tokio::test]
    async fn test_buffer_rejects_second_write() {
        let mut buffer = ResponseBuffer::new();
        buffer.write_msg(Message::new()).await.unwrap();

        let second = buffer.write_msg(Message::new()).await;

        assert!(matches!(second, Err(DomainError::ResponseAlreadyWritten)));
    }
}
