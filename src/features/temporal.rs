//! Per-row features from the event's own fields and timestamp.

use crate::events::AuditEvent;
use chrono::{Datelike, Timelike};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemporalFeatures {
    pub event_hour: u32,
    pub event_type_code: u32,
    pub resource_depth: u32,
    pub is_privileged_event: u8,
    pub is_weekend: u8,
}

/// Dense event-type codes, one per row.
///
/// Without a vocabulary, codes follow first appearance in `events`. With one,
/// a type's code is its index in the vocabulary and unknown types share
/// `vocabulary.len()`.
pub fn encode_event_types(events: &[AuditEvent], vocabulary: Option<&[String]>) -> Vec<u32> {
    let mut codes: HashMap<&str, u32> = HashMap::new();
    match vocabulary {
        Some(vocab) => {
            for (i, name) in vocab.iter().enumerate() {
                codes.entry(name.as_str()).or_insert(i as u32);
            }
            let unknown = vocab.len() as u32;
            events
                .iter()
                .map(|e| codes.get(e.event_type.as_str()).copied().unwrap_or(unknown))
                .collect()
        }
        None => events
            .iter()
            .map(|e| {
                let next = codes.len() as u32;
                *codes.entry(e.event_type.as_str()).or_insert(next)
            })
            .collect(),
    }
}

/// Number of `/` in the resource path.
pub fn resource_depth(resource: &str) -> u32 {
    resource.matches('/').count() as u32
}

pub fn derive(events: &[AuditEvent], vocabulary: Option<&[String]>) -> Vec<TemporalFeatures> {
    let codes = encode_event_types(events, vocabulary);
    events
        .iter()
        .zip(codes)
        .map(|(e, event_type_code)| TemporalFeatures {
            event_hour: e.timestamp.hour(),
            event_type_code,
            resource_depth: resource_depth(&e.resource),
            is_privileged_event: e.is_privileged() as u8,
            // Monday = 0; Saturday and Sunday are 5 and 6
            is_weekend: (e.timestamp.weekday().num_days_from_monday() >= 5) as u8,
        })
        .collect()
}
