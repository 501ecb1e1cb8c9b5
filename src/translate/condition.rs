//! Declared condition entries <-> remote tagged conditions

use super::error::{ValidationError, ValidationErrors};
use super::validate::{check_header_name, check_non_empty, check_request_methods, check_values};
use crate::model::{
    Condition, ConditionField, DeclaredCondition, FieldPath, HttpHeaderBlock, QueryStringPair,
    ValuesBlock,
};

/// Expand declared conditions into remote tagged conditions.
///
/// Each entry must populate exactly one slot. All entries are validated
/// before returning so every bad entry is reported at once.
pub fn expand_conditions(declared: &[DeclaredCondition]) -> Result<Vec<Condition>, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut conditions = Vec::with_capacity(declared.len());

    for (position, entry) in declared.iter().enumerate() {
        let path = FieldPath::root().field("condition").index(position);
        if let Some(condition) = expand_condition(entry, &path, &mut errors) {
            conditions.push(condition);
        }
    }

    errors.into_result(conditions)
}

fn expand_condition(
    entry: &DeclaredCondition,
    path: &FieldPath,
    errors: &mut ValidationErrors,
) -> Option<Condition> {
    let field = match entry.populated_slots().as_slice() {
        [] => {
            errors.push(ValidationError::MissingConditionField { path: path.clone() });
            return None;
        }
        [field] => *field,
        populated => {
            errors.push(ValidationError::AmbiguousConditionField {
                path: path.clone(),
                populated: populated.iter().map(|f| f.slot_name()).collect(),
            });
            return None;
        }
    };

    let slot = path.clone().field(field.slot_name());
    match field {
        ConditionField::HostHeader => entry.host_header.as_ref().map(|block| Condition::HostHeader {
            values: checked_values(&slot, block, errors),
        }),
        ConditionField::HttpHeader => entry.http_header.as_ref().map(|block| {
            check_header_name(
                slot.clone().field("http_header_name"),
                &block.http_header_name,
                errors,
            );
            check_values(slot.clone().field("values"), &block.values, errors);
            Condition::HttpHeader {
                http_header_name: block.http_header_name.clone(),
                values: block.values.clone(),
            }
        }),
        ConditionField::HttpRequestMethod => entry.http_request_method.as_ref().map(|block| {
            check_request_methods(slot.clone().field("values"), &block.values, errors);
            Condition::HttpRequestMethod {
                values: block.values.clone(),
            }
        }),
        ConditionField::PathPattern => entry.path_pattern.as_ref().map(|block| Condition::PathPattern {
            values: checked_values(&slot, block, errors),
        }),
        ConditionField::QueryString => Some(Condition::QueryString {
            values: query_pairs(&slot, &entry.query_string, errors),
        }),
        ConditionField::SourceIp => entry.source_ip.as_ref().map(|block| Condition::SourceIp {
            values: checked_values(&slot, block, errors),
        }),
    }
}

fn checked_values(slot: &FieldPath, block: &ValuesBlock, errors: &mut ValidationErrors) -> Vec<String> {
    check_values(slot.clone().field("values"), &block.values, errors);
    block.values.clone()
}

/// Empty keys are dropped rather than sent as `""`.
fn query_pairs(
    slot: &FieldPath,
    pairs: &[QueryStringPair],
    errors: &mut ValidationErrors,
) -> Vec<QueryStringPair> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| {
            check_non_empty(slot.clone().index(i).field("value"), &pair.value, errors);
            QueryStringPair {
                key: pair.key.clone().filter(|key| !key.is_empty()),
                value: pair.value.clone(),
            }
        })
        .collect()
}

/// Flatten remote conditions into declared entries, one per condition.
pub fn flatten_conditions(remote: Vec<Condition>) -> Vec<DeclaredCondition> {
    remote.into_iter().map(flatten_condition).collect()
}

fn flatten_condition(condition: Condition) -> DeclaredCondition {
    match condition {
        Condition::HostHeader { values } => DeclaredCondition {
            host_header: Some(ValuesBlock { values }),
            ..Default::default()
        },
        Condition::HttpHeader {
            http_header_name,
            values,
        } => DeclaredCondition {
            http_header: Some(HttpHeaderBlock {
                http_header_name,
                values,
            }),
            ..Default::default()
        },
        Condition::HttpRequestMethod { values } => DeclaredCondition {
            http_request_method: Some(ValuesBlock { values }),
            ..Default::default()
        },
        Condition::PathPattern { values } => DeclaredCondition {
            path_pattern: Some(ValuesBlock { values }),
            ..Default::default()
        },
        Condition::QueryString { values } => DeclaredCondition {
            query_string: values,
            ..Default::default()
        },
        Condition::SourceIp { values } => DeclaredCondition {
            source_ip: Some(ValuesBlock { values }),
            ..Default::default()
        },
    }
}
