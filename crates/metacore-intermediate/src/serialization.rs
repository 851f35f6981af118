//! Propagation of serialization settings through the class hierarchy.

use crate::hierarchy::Ontology;
use crate::types::Serialization;
use metacore_common::Diagnostic;
use metacore_common::diagnostics::into_result;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// A resolved setting together with the class that declared it.
#[derive(Clone, Copy, Debug)]
struct SettingWithSource<'a> {
    value: bool,
    source: &'a str,
}

/// Resolve `with_model_type` for every class of the ontology.
///
/// A class takes its own explicit setting if it has one, otherwise the
/// setting its ancestors agree on, otherwise `false`. Disagreements between
/// a class and its bases, or between bases, are reported for every class
/// where they occur.
pub fn resolve_serializations(
    ontology: &Ontology<'_>,
) -> Result<FxHashMap<String, Serialization>, Vec<Diagnostic>> {
    let mut with_model_type: FxHashMap<&str, Option<SettingWithSource<'_>>> = FxHashMap::default();
    let mut errors = Vec::new();

    for class in ontology.classes() {
        let mut settings: Vec<SettingWithSource<'_>> = Vec::new();

        if let Some(value) = class.declared_with_model_type() {
            settings.push(SettingWithSource {
                value,
                source: class.name.as_str(),
            });
        }

        for base in &class.inheritances {
            if let Some(Some(setting)) = with_model_type.get(base.as_str()) {
                settings.push(*setting);
            }
        }

        if let Some((first, rest)) = settings.split_first() {
            for setting in rest {
                if setting.value != first.value {
                    errors.push(Diagnostic::consistency(
                        class.span,
                        format!(
                            "The serialization setting with_model_type between the class {} \
                             and {} is inconsistent",
                            setting.source, first.source
                        ),
                    ));
                }
            }
        }

        let resolved = settings.first().copied();
        trace!(class = %class.name, ?resolved, "resolved with_model_type");
        with_model_type.insert(class.name.as_str(), resolved);
    }

    debug!(classes = with_model_type.len(), errors = errors.len(), "serializations resolved");

    let mapping = with_model_type
        .into_iter()
        .map(|(name, setting)| {
            let serialization = Serialization {
                with_model_type: setting.is_some_and(|setting| setting.value),
            };
            (name.to_string(), serialization)
        })
        .collect();

    into_result(mapping, errors)
}
