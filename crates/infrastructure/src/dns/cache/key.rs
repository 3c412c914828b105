use ferrous_relay_domain::to_fqdn;
use hickory_proto::op::Message;
use hickory_proto::rr::{DNSClass, RecordType};

/// Normalized (name, class, type) of a request's first question.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub name: String,
    pub class: DNSClass,
    pub record_type: RecordType,
}

impl CacheKey {
    pub fn new(name: &str, class: DNSClass, record_type: RecordType) -> Self {
        Self {
            name: to_fqdn(name),
            class,
            record_type,
        }
    }

    pub fn from_request(request: &Message) -> Option<Self> {
        let query = request.queries().first()?;
        Some(Self::new(
            &query.name().to_string(),
            query.query_class(),
            query.query_type(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::Query;
    use hickory_proto::rr::Name;
    use std::str::FromStr;

    #[test]
    fn test_key_is_case_insensitive() {
        let mut upper = Message::new();
        upper.add_query(Query::query(
            Name::from_str("WWW.Example.COM.").unwrap(),
            RecordType::A,
        ));

        let key = CacheKey::from_request(&upper).unwrap();

        assert_eq!(key, CacheKey::new("www.example.com.", DNSClass::IN, RecordType::A));
    }

    #[test]
    fn test_no_question_no_key() {
        assert!(CacheKey::from_request(&Message::new()).is_none());
    }
}
