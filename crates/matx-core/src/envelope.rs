//! Response-envelope normalization.
//!
//! The two API families wrap records differently: the OQMD family puts them
//! under `data` or `results`, the OPTIMADE family additionally nests each
//! record in an `attributes` sub-object. The shape is declared per endpoint
//! rather than sniffed from the response.

use serde_json::Value;

use crate::error::FetchError;

/// Declarative description of where an endpoint keeps its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeShape {
    /// Top-level field holding the record list.
    pub records_field: &'static str,
    /// Whether each record must be unwrapped from an `attributes` sub-object.
    pub flatten_attributes: bool,
}

/// One page of the catalog response, normalized to a flat record list plus
/// the pagination metadata the planner needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope {
    pub records: Vec<Value>,
    /// `meta.data_available` — the server's reported total, when present.
    pub total_available: Option<u64>,
    /// `meta.data_returned` — how many records this page carried.
    pub returned_count: Option<u64>,
    /// Continuation URL some endpoints emit instead of `meta`. The client
    /// never follows it (the server answers it with redirects); its presence
    /// only signals that more data exists.
    pub next: Option<String>,
}

/// Parse one page body against the endpoint's declared shape.
///
/// A missing records field is a hard [`FetchError::MalformedEnvelope`],
/// never an empty page. A single-object records field counts as one record.
pub fn parse_page(body: &str, shape: EnvelopeShape) -> Result<PageEnvelope, FetchError> {
    let mut root: Value = serde_json::from_str(body)?;

    let raw = root
        .get_mut(shape.records_field)
        .map(Value::take)
        .ok_or_else(|| FetchError::malformed(shape.records_field))?;

    let records = match raw {
        Value::Array(items) => items,
        record @ Value::Object(_) => vec![record],
        _ => return Err(FetchError::malformed(shape.records_field)),
    };

    let records = if shape.flatten_attributes {
        records
            .into_iter()
            .map(|mut record| {
                record
                    .get_mut("attributes")
                    .map(Value::take)
                    .ok_or_else(|| FetchError::malformed("attributes"))
            })
            .collect::<Result<Vec<_>, _>>()?
    } else {
        records
    };

    let meta = root.get("meta");
    let total_available = meta
        .and_then(|m| m.get("data_available"))
        .and_then(Value::as_u64);
    let returned_count = meta
        .and_then(|m| m.get("data_returned"))
        .and_then(Value::as_u64);
    let next = root
        .get("next")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Ok(PageEnvelope {
        records,
        total_available,
        returned_count,
        next,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: EnvelopeShape = EnvelopeShape {
        records_field: "data",
        flatten_attributes: false,
    };

    const FLATTENED: EnvelopeShape = EnvelopeShape {
        records_field: "data",
        flatten_attributes: true,
    };

    #[test]
    fn reads_records_and_meta() {
        let body = r#"{
            "data": [{"id": 1}, {"id": 2}],
            "meta": {"data_available": 120, "data_returned": 2}
        }"#;

        let page = parse_page(body, PLAIN).expect("valid envelope");
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.total_available, Some(120));
        assert_eq!(page.returned_count, Some(2));
        assert_eq!(page.next, None);
    }

    #[test]
    fn records_under_results_field() {
        let body = r#"{"results": [{"id": 7}]}"#;
        let shape = EnvelopeShape {
            records_field: "results",
            flatten_attributes: false,
        };

        let page = parse_page(body, shape).expect("valid envelope");
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_available, None);
    }

    #[test]
    fn flattens_attribute_wrapped_records() {
        let body = r#"{"data": [
            {"id": "s-1", "attributes": {"lattice": [1, 2, 3]}},
            {"id": "s-2", "attributes": {"lattice": [4, 5, 6]}}
        ]}"#;

        let page = parse_page(body, FLATTENED).expect("valid envelope");
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0]["lattice"][0], 1);
        assert!(page.records[0].get("attributes").is_none());
    }

    #[test]
    fn missing_attributes_wrapper_is_malformed() {
        let body = r#"{"data": [{"id": "s-1"}]}"#;
        let error = parse_page(body, FLATTENED).expect_err("must fail");
        assert!(matches!(error, FetchError::MalformedEnvelope { field } if field == "attributes"));
    }

    #[test]
    fn missing_records_field_is_malformed_not_empty() {
        let body = r#"{"meta": {"data_available": 10}}"#;
        let error = parse_page(body, PLAIN).expect_err("must fail");
        assert!(matches!(error, FetchError::MalformedEnvelope { field } if field == "data"));
    }

    #[test]
    fn single_object_records_field_counts_as_one_record() {
        let body = r#"{"data": {"id": 1}}"#;
        let page = parse_page(body, PLAIN).expect("valid envelope");
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn next_link_is_surfaced() {
        let body = r#"{"data": [], "next": "https://example.test/structures?page_offset=50"}"#;
        let page = parse_page(body, PLAIN).expect("valid envelope");
        assert!(page.next.is_some());
    }

    #[test]
    fn invalid_json_is_rejected() {
        assert!(matches!(parse_page("not json", PLAIN), Err(FetchError::Json(_))));
    }
}
