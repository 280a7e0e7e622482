use crate::{RecordClass, RecordType};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;

/// Response code reported by the resolver engine for one sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    Other(u8),
}

impl ResponseCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NxDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::Other(_) => "OTHER",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordData {
    Address(IpAddr),
    Name(Arc<str>),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub record_class: RecordClass,
    pub ttl: u32,
    pub data: RecordData,
}

impl AnswerRecord {
    /// A or AAAA record for `address`; the type follows the address family.
    pub fn address(name: impl Into<Arc<str>>, address: IpAddr, ttl: u32) -> Self {
        let record_type = match address {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::AAAA,
        };
        Self {
            name: name.into(),
            record_type,
            record_class: RecordClass::IN,
            ttl,
            data: RecordData::Address(address),
        }
    }
}

/// Result the resolver engine hands back for one answered sub-query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsAnswer {
    pub rcode: ResponseCode,
    pub records: Vec<AnswerRecord>,
}

impl DnsAnswer {
    pub fn new(rcode: ResponseCode, records: Vec<AnswerRecord>) -> Self {
        Self { rcode, records }
    }

    pub fn no_error(records: Vec<AnswerRecord>) -> Self {
        Self::new(ResponseCode::NoError, records)
    }

    pub fn nx_domain() -> Self {
        Self::new(ResponseCode::NxDomain, Vec::new())
    }

    pub fn addresses(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.records.iter().filter_map(|record| match record.data {
            RecordData::Address(ip) => Some(ip),
            _ => None,
        })
    }

    pub fn min_ttl(&self) -> Option<u32> {
        self.records.iter().map(|record| record.ttl).min()
    }
}
