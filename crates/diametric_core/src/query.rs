//! Query assembly.

use crate::config::FilterPolicy;
use crate::entity::EntityTypeDescriptor;
use crate::error::{CoreError, CoreResult};
use diametric_edn::{Keyword, Symbol, ToEdn, Value};
use tracing::{debug, warn};

/// Variable bound to the entity id in every query.
pub const ENTITY_VAR: &str = "e";

/// One `[?e :prefix/attr ?attr]` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Entity variable.
    pub entity: Symbol,
    /// Qualified attribute ident.
    pub attribute: Keyword,
    /// Value variable.
    pub value: Symbol,
}

impl ToEdn for Clause {
    fn to_edn(&self) -> Value {
        Value::Vector(vec![
            Value::Symbol(self.entity.clone()),
            Value::Keyword(self.attribute.clone()),
            Value::Symbol(self.value.clone()),
        ])
    }
}

/// A find/in/where query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    find: Vec<Symbol>,
    inputs: Vec<Symbol>,
    clauses: Vec<Clause>,
}

impl Query {
    /// `:find` variables: the entity, then one per attribute.
    pub fn find(&self) -> &[Symbol] {
        &self.find
    }

    /// `:in` section: `$`, then one variable per filter.
    pub fn inputs(&self) -> &[Symbol] {
        &self.inputs
    }

    /// `:where` clauses, one per attribute.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

impl ToEdn for Query {
    fn to_edn(&self) -> Value {
        let mut forms = Vec::with_capacity(3 + self.find.len() + self.inputs.len() + self.clauses.len());
        forms.push(Value::Keyword(Keyword::bare("find")));
        forms.extend(self.find.iter().cloned().map(Value::Symbol));
        forms.push(Value::Keyword(Keyword::bare("in")));
        forms.extend(self.inputs.iter().cloned().map(Value::Symbol));
        forms.push(Value::Keyword(Keyword::bare("where")));
        forms.extend(self.clauses.iter().map(ToEdn::to_edn));
        Value::Vector(forms)
    }
}

/// A query paired with its positional arguments.
///
/// `args[i]` binds `query.inputs()[i + 1]`; the data source `$` takes no
/// argument here, the executor supplies it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// The query.
    pub query: Query,
    /// Filter values in `:in` order.
    pub args: Vec<Value>,
}

impl QueryRequest {
    /// Arguments as one EDN vector.
    pub fn args_edn(&self) -> Value {
        Value::Vector(self.args.clone())
    }
}

/// Builds entity queries from descriptors and filter parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    policy: FilterPolicy,
}

impl QueryBuilder {
    /// Creates a builder with the given unknown-filter policy.
    pub fn new(policy: FilterPolicy) -> Self {
        Self { policy }
    }

    /// Builds the query fetching every attribute of `descriptor`, with
    /// one input per filter in iteration order.
    ///
    /// A filter binds only when its key names a declared attribute: the
    /// input variable then coincides with that attribute's value
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateFilterParameter`] when a key repeats,
    /// [`CoreError::ReservedName`] for a key naming the entity variable
    /// and, under [`FilterPolicy::Reject`],
    /// [`CoreError::UnknownFilterParameter`] for an undeclared key.
    pub fn build<I, K, V>(&self, descriptor: &EntityTypeDescriptor, filters: I) -> CoreResult<QueryRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entity = Symbol::var(ENTITY_VAR);

        let mut find = Vec::with_capacity(descriptor.len() + 1);
        find.push(entity.clone());
        let mut clauses = Vec::with_capacity(descriptor.len());
        for name in descriptor.attribute_names() {
            let var = Symbol::var(name);
            find.push(var.clone());
            clauses.push(Clause {
                entity: entity.clone(),
                attribute: descriptor.ident(name),
                value: var,
            });
        }

        let mut inputs = vec![Symbol::source()];
        let mut args = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for (key, value) in filters {
            let key = key.into();
            if seen.contains(&key) {
                return Err(CoreError::DuplicateFilterParameter { parameter: key });
            }
            if key == ENTITY_VAR {
                return Err(CoreError::ReservedName {
                    entity_type: descriptor.name().to_string(),
                    name: key,
                });
            }
            if !descriptor.has_attribute(&key) {
                match self.policy {
                    FilterPolicy::Bind => {}
                    FilterPolicy::Warn => warn!(
                        entity_type = descriptor.name(),
                        parameter = %key,
                        "filter parameter matches no attribute and will not constrain the query"
                    ),
                    FilterPolicy::Reject => {
                        return Err(CoreError::UnknownFilterParameter {
                            entity_type: descriptor.name().to_string(),
                            parameter: key,
                        })
                    }
                }
            }
            inputs.push(Symbol::var(&key));
            args.push(value.into());
            seen.push(key);
        }

        debug!(
            entity_type = descriptor.name(),
            attributes = descriptor.len(),
            filters = args.len(),
            "built query"
        );

        Ok(QueryRequest {
            query: Query {
                find,
                inputs,
                clauses,
            },
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AttributeOptions, SemanticType};

    fn person() -> EntityTypeDescriptor {
        EntityTypeDescriptor::builder("Person")
            .prefix("p")
            .attribute("name", SemanticType::String, AttributeOptions::new())
            .attribute("age", SemanticType::Long, AttributeOptions::new())
            .build()
            .unwrap()
    }

    fn no_filters() -> Vec<(String, Value)> {
        Vec::new()
    }

    #[test]
    fn unfiltered_query() {
        let request = QueryBuilder::default().build(&person(), no_filters()).unwrap();
        let query = &request.query;

        assert_eq!(
            query.find(),
            &[Symbol::var("e"), Symbol::var("name"), Symbol::var("age")]
        );
        assert_eq!(query.inputs(), &[Symbol::source()]);
        assert_eq!(query.clauses().len(), 2);
        assert_eq!(query.clauses()[1].attribute, Keyword::namespaced("p", "age"));
        assert!(request.args.is_empty());

        assert_eq!(
            query.to_edn_string().unwrap(),
            "[:find ?e ?name ?age :in $ :where [?e :p/name ?name] [?e :p/age ?age]]"
        );
    }

    #[test]
    fn filters_become_inputs_in_order() {
        let request = QueryBuilder::default()
            .build(&person(), [("age", Value::from(30i64)), ("name", Value::from("Ann"))])
            .unwrap();

        assert_eq!(
            request.query.inputs(),
            &[Symbol::source(), Symbol::var("age"), Symbol::var("name")]
        );
        assert_eq!(request.args, vec![Value::Integer(30), Value::from("Ann")]);
        assert_eq!(request.args_edn().to_edn_string().unwrap(), "[30 \"Ann\"]");
    }

    #[test]
    fn unknown_filter_is_emitted_under_bind_and_warn() {
        for policy in [FilterPolicy::Bind, FilterPolicy::Warn] {
            let request = QueryBuilder::new(policy)
                .build(&person(), [("email", "x@y.com")])
                .unwrap();
            assert!(request.query.inputs().contains(&Symbol::var("email")));
            assert_eq!(request.args, vec![Value::from("x@y.com")]);
            assert_eq!(request.query.clauses().len(), 2);
        }
    }

    #[test]
    fn unknown_filter_rejected_under_reject() {
        let err = QueryBuilder::new(FilterPolicy::Reject)
            .build(&person(), [("email", "x@y.com")])
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownFilterParameter {
                entity_type: "Person".into(),
                parameter: "email".into(),
            }
        );
    }

    #[test]
    fn entity_variable_filter_rejected_under_every_policy() {
        for policy in [FilterPolicy::Bind, FilterPolicy::Warn, FilterPolicy::Reject] {
            let err = QueryBuilder::new(policy)
                .build(&person(), [("e", Value::Integer(7))])
                .unwrap_err();
            assert_eq!(
                err,
                CoreError::ReservedName {
                    entity_type: "Person".into(),
                    name: "e".into(),
                }
            );
        }
    }

    #[test]
    fn repeated_filter_rejected() {
        let err = QueryBuilder::default()
            .build(&person(), [("name", "Ann"), ("name", "Bob")])
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::DuplicateFilterParameter {
                parameter: "name".into()
            }
        );
    }
}
