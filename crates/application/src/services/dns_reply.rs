use hickory_proto::op::{Message, MessageType, ResponseCode};

/// Empty answer to `request` carrying `code`, with the question echoed back.
pub fn reply_with_code(request: &Message, code: ResponseCode) -> Message {
    let mut response = Message::new();
    response
        .set_id(request.id())
        .set_message_type(MessageType::Response)
        .set_op_code(request.op_code())
        .set_recursion_desired(request.recursion_desired())
        .set_recursion_available(true)
        .set_response_code(code);
    response.add_queries(request.queries().iter().cloned());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::Query;
    use hickory_proto::rr::{Name, RecordType};
    use std::str::FromStr;

    #[test]
    fn test_refused_reply_echoes_question() {
        let mut request = Message::new();
        request.set_id(4242).set_recursion_desired(true);
        request.add_query(Query::query(
            Name::from_str("ads.example.com.").unwrap(),
            RecordType::A,
        ));

        let reply = reply_with_code(&request, ResponseCode::Refused);

        assert_eq!(reply.id(), 4242);
        assert_eq!(reply.message_type(), MessageType::Response);
        assert_eq!(reply.response_code(), ResponseCode::Refused);
        assert_eq!(reply.queries(), request.queries());
        assert!(reply.answers().is_empty());
    }
}
