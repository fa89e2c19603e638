//! The compiled form of a single subschema: an ordered set of keyword
//! behaviors plus its location within the owning resource.
use std::collections::VecDeque;

use ahash::AHashMap;
use solidus_referencing::{uri, Uri};
use solidus_value::{Pointer, ReferenceToken, Value};

use crate::{
    compiler::Context,
    error::ErrorIterator,
    output::{Annotations, BasicOutput, ErrorDescription, OutputUnit},
    paths::LocationNode,
    validator::{BoxedValidator, PartialApplication, Validate},
};

/// A node in the compiled schema tree.
#[derive(Debug)]
pub(crate) struct SchemaNode {
    validators: NodeValidators,
    /// Keyword location of this subschema from the root resource.
    location: Pointer,
    /// Canonical URI of this subschema, when the enclosing resource has one.
    absolute_location: Option<Uri<String>>,
}

enum NodeValidators {
    /// A boolean schema: `true` has no validator, `false` always fails.
    Boolean { validator: Option<BoxedValidator> },
    /// An object schema: named keyword behaviors in execution order.
    Keyword(Box<KeywordValidators>),
}

impl std::fmt::Debug for NodeValidators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean { .. } => f.debug_struct("Boolean").finish(),
            Self::Keyword(_) => f.debug_tuple("Keyword").finish(),
        }
    }
}

struct KeywordValidators {
    /// Keywords no vocabulary claimed, kept to surface as annotations.
    unmatched_keywords: Option<AHashMap<String, Value>>,
    validators: Vec<(String, BoxedValidator)>,
}

impl SchemaNode {
    pub(crate) fn from_boolean(ctx: &Context<'_>, validator: Option<BoxedValidator>) -> SchemaNode {
        SchemaNode {
            location: ctx.location().clone(),
            absolute_location: ctx.base_uri(),
            validators: NodeValidators::Boolean { validator },
        }
    }

    pub(crate) fn from_keywords(
        ctx: &Context<'_>,
        mut validators: Vec<(String, BoxedValidator)>,
        unmatched_keywords: Option<AHashMap<String, Value>>,
    ) -> SchemaNode {
        validators.shrink_to_fit();
        SchemaNode {
            location: ctx.location().clone(),
            absolute_location: ctx.base_uri(),
            validators: NodeValidators::Keyword(Box::new(KeywordValidators {
                unmatched_keywords,
                validators,
            })),
        }
    }

    /// Like [`Validate::apply`], but since the node knows its position it
    /// returns a complete [`BasicOutput`]. Applicators use this to compose
    /// results from their subschemas.
    pub(crate) fn apply_rooted(&self, instance: &Value, location: &LocationNode) -> BasicOutput {
        match self.apply(instance, location) {
            PartialApplication::Valid {
                annotations,
                child_results,
            } => {
                let mut output = BasicOutput::valid(child_results);
                if let Some(annotations) = annotations {
                    output.push_front(self.annotation_at(location, annotations));
                }
                output
            }
            PartialApplication::Invalid {
                errors,
                mut child_results,
            } => {
                for error in errors {
                    child_results.push_front(self.error_at(location, error));
                }
                BasicOutput::invalid(child_results)
            }
        }
    }

    pub(crate) fn error_at(
        &self,
        location: &LocationNode,
        error: ErrorDescription,
    ) -> OutputUnit<'static> {
        OutputUnit::error(
            self.location.clone(),
            location.into(),
            self.absolute_location.clone(),
            error,
        )
    }

    pub(crate) fn annotation_at<'a>(
        &self,
        location: &LocationNode,
        annotations: Annotations<'a>,
    ) -> OutputUnit<'a> {
        OutputUnit::annotation(
            self.location.clone(),
            location.into(),
            self.absolute_location.clone(),
            annotations,
        )
    }

    /// Avoids boxing for the single-validator case, which covers most leaf
    /// nodes of a compiled tree.
    pub(crate) fn err_iter<'i>(
        &self,
        instance: &'i Value,
        location: &LocationNode,
    ) -> NodeValidatorsErrIter<'i> {
        match &self.validators {
            NodeValidators::Keyword(inner) if inner.validators.len() == 1 => {
                NodeValidatorsErrIter::Single(inner.validators[0].1.validate(instance, location))
            }
            NodeValidators::Keyword(inner) => NodeValidatorsErrIter::Multiple(
                inner
                    .validators
                    .iter()
                    .flat_map(|(_, validator)| validator.validate(instance, location))
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            NodeValidators::Boolean {
                validator: Some(validator),
            } => NodeValidatorsErrIter::Single(validator.validate(instance, location)),
            NodeValidators::Boolean { validator: None } => NodeValidatorsErrIter::NoErrs,
        }
    }

    fn absolute_location_for(&self, keyword_location: &Pointer) -> Option<Uri<String>> {
        self.absolute_location.as_ref().map(|absolute| {
            let mut fragment = String::new();
            for token in keyword_location.tokens() {
                fragment.push('/');
                uri::encode_to(&token.as_text(), &mut fragment);
            }
            uri::resolve_against(&absolute.borrow(), &format!("#{fragment}"))
                .expect("fragment is a valid reference")
        })
    }

    /// Apply the keyword behaviors in order, attaching each outcome at its
    /// keyword location.
    fn apply_subschemas<'a, I, P>(
        &self,
        instance: &Value,
        location: &LocationNode,
        path_and_validators: I,
        annotations: Option<Annotations<'a>>,
    ) -> PartialApplication<'a>
    where
        I: Iterator<Item = (P, &'a BoxedValidator)> + 'a,
        P: Into<ReferenceToken>,
    {
        let mut results: VecDeque<OutputUnit<'a>> = VecDeque::new();
        let mut valid = true;
        for (path, validator) in path_and_validators {
            let keyword_location = self.location.join(path);
            let absolute_location = self.absolute_location_for(&keyword_location);
            match validator.apply(instance, location) {
                PartialApplication::Valid {
                    annotations,
                    child_results,
                } => {
                    if let Some(annotations) = annotations {
                        results.push_back(OutputUnit::annotation(
                            keyword_location,
                            location.into(),
                            absolute_location,
                            annotations,
                        ));
                    } else {
                        results.push_back(OutputUnit::pass(
                            keyword_location,
                            location.into(),
                            absolute_location,
                        ));
                    }
                    results.extend(child_results);
                }
                PartialApplication::Invalid {
                    errors,
                    child_results,
                } => {
                    valid = false;
                    for error in errors {
                        results.push_back(OutputUnit::error(
                            keyword_location.clone(),
                            location.into(),
                            absolute_location.clone(),
                            error,
                        ));
                    }
                    results.extend(child_results);
                }
            }
        }
        if valid {
            PartialApplication::Valid {
                annotations,
                child_results: results,
            }
        } else {
            // Annotations below a failing schema are not collected.
            for unit in &mut results {
                unit.drop_annotation();
            }
            PartialApplication::Invalid {
                errors: Vec::new(),
                child_results: results,
            }
        }
    }
}

impl Validate for SchemaNode {
    fn validate<'i>(&self, instance: &'i Value, location: &LocationNode) -> ErrorIterator<'i> {
        Box::new(self.err_iter(instance, location))
    }

    fn is_valid(&self, instance: &Value) -> bool {
        match &self.validators {
            // A single direct call skips the iterator plumbing; leaves of
            // the tree are almost always single-validator nodes.
            NodeValidators::Keyword(inner) if inner.validators.len() == 1 => {
                inner.validators[0].1.is_valid(instance)
            }
            NodeValidators::Keyword(inner) => inner
                .validators
                .iter()
                .all(|(_, validator)| validator.is_valid(instance)),
            NodeValidators::Boolean { validator: Some(_) } => false,
            NodeValidators::Boolean { validator: None } => true,
        }
    }

    fn apply<'a>(&'a self, instance: &Value, location: &LocationNode) -> PartialApplication<'a> {
        match &self.validators {
            NodeValidators::Boolean { validator } => {
                if let Some(validator) = validator {
                    validator.apply(instance, location)
                } else {
                    PartialApplication::valid_empty()
                }
            }
            NodeValidators::Keyword(inner) => {
                let KeywordValidators {
                    unmatched_keywords,
                    validators,
                } = &**inner;
                let annotations: Option<Annotations<'a>> =
                    unmatched_keywords.as_ref().map(Annotations::from);
                self.apply_subschemas(
                    instance,
                    location,
                    validators
                        .iter()
                        .map(|(keyword, validator)| (keyword.as_str(), validator)),
                    annotations,
                )
            }
        }
    }
}

pub(crate) enum NodeValidatorsErrIter<'i> {
    NoErrs,
    Single(ErrorIterator<'i>),
    Multiple(std::vec::IntoIter<crate::ValidationError<'i>>),
}

impl<'i> Iterator for NodeValidatorsErrIter<'i> {
    type Item = crate::ValidationError<'i>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::NoErrs => None,
            Self::Single(iter) => iter.next(),
            Self::Multiple(iter) => iter.next(),
        }
    }
}
