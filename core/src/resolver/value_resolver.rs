use super::chain::ValueResolver;
use super::classifier::{classify, Applicability, BindingTarget};
use crate::config::BindingConfig;
use crate::denormalizer::{
    violation_from_error, violations_from_partial, DenormalizationContext, DenormalizeError,
    Denormalizer, Format, SchemaDenormalizer,
};
use crate::errors::{error_codes, BindingError};
use crate::form::{collect_form_errors, FormFactory, FormRegistry};
use crate::metadata::{ArgumentMetadata, TypeIntrospector, TypeRegistry};
use crate::request::{extract_payload, RequestSource};
use crate::types::{BindingOutcome, BoundInstance, RawPayload};
use crate::validation::{build_error_tree, ConstraintValidator, RuleValidator, ViolationList};
use serde_json::Value;
use std::sync::Arc;

/// **REQUEST VALUE RESOLVER**
///
/// **PURPOSE**: Populates opted-in controller arguments from the request,
/// either through a form or by direct denormalization plus validation.
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct RequestValueResolver {
    types: Arc<dyn TypeIntrospector>,
    denormalizer: Arc<dyn Denormalizer>,
    validator: Arc<dyn ConstraintValidator>,
    forms: Arc<dyn FormFactory>,
    config: BindingConfig,
}

impl RequestValueResolver {
    pub fn new(
        types: Arc<dyn TypeIntrospector>,
        denormalizer: Arc<dyn Denormalizer>,
        validator: Arc<dyn ConstraintValidator>,
        forms: Arc<dyn FormFactory>,
        config: BindingConfig,
    ) -> Self {
        Self {
            types,
            denormalizer,
            validator,
            forms,
            config,
        }
    }

    /// Resolver backed by the schema denormalizer and the rule validator of
    /// `types`. The form settings of `config` are applied to `forms`.
    pub fn standard(types: Arc<TypeRegistry>, forms: FormRegistry, config: BindingConfig) -> Self {
        let forms = forms.with_config(&config);
        Self::new(
            types.clone(),
            Arc::new(SchemaDenormalizer::new(types.clone())),
            Arc::new(RuleValidator::new(types)),
            Arc::new(forms),
            config,
        )
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// **BINDING EXECUTION**
    ///
    /// **RETURNS**:
    /// - `Ok(Skipped)` - The argument did not opt in; the request is untouched
    /// - `Ok(Bound)` / `Ok(Rejected)` - Terminal outcome for the argument
    /// - `Err(..)` - Unreadable body or misconfigured registry
    pub fn bind(
        &self,
        request: &dyn RequestSource,
        argument: &ArgumentMetadata,
    ) -> Result<BindingOutcome, BindingError> {
        let target = match classify(self.types.as_ref(), argument) {
            Applicability::Applicable(target) => target,
            Applicability::NotApplicable => {
                log::debug!("argument '{}' is not bound from the request", argument.name);
                return Ok(BindingOutcome::Skipped);
            }
        };

        let payload = extract_payload(request, &self.config)?;
        let outcome = match target.form_id() {
            Some(form_id) => {
                log::debug!(
                    "binding '{}' through form '{}'",
                    target.argument_name,
                    form_id
                );
                self.bind_form(&target, form_id, &payload)?
            }
            None => {
                log::debug!(
                    "denormalizing '{}' into '{}'",
                    target.argument_name,
                    target.type_name
                );
                self.bind_direct(&target, request, &payload)?
            }
        };

        if let BindingOutcome::Rejected(errors) = &outcome {
            log::debug!(
                "argument '{}' rejected with {} error(s)",
                target.argument_name,
                errors.message_count()
            );
        }
        Ok(outcome)
    }

    /// Zero or one bound instance, or the validation failure.
    pub fn resolve(
        &self,
        request: &dyn RequestSource,
        argument: &ArgumentMetadata,
    ) -> Result<Option<BoundInstance>, BindingError> {
        self.bind(request, argument)?.into_result()
    }

    fn bind_form(
        &self,
        target: &BindingTarget,
        form_id: &str,
        payload: &RawPayload,
    ) -> Result<BindingOutcome, BindingError> {
        let mut form = self.forms.create_form(form_id, &target.type_name)?;
        form.submit(payload, self.config.clear_missing)?;

        if form.is_submitted() && form.is_valid() {
            return Ok(BindingOutcome::Bound(BoundInstance::new(
                target.type_name.clone(),
                form.data(),
            )));
        }
        Ok(BindingOutcome::Rejected(collect_form_errors(&*form)))
    }

    fn bind_direct(
        &self,
        target: &BindingTarget,
        request: &dyn RequestSource,
        payload: &RawPayload,
    ) -> Result<BindingOutcome, BindingError> {
        let format = Format::for_content(request.content_format().as_ref());
        let (instance, mut violations) = match self.denormalizer.denormalize(
            payload,
            &target.type_name,
            format,
            DenormalizationContext::REQUEST,
        ) {
            Ok(data) => (Some(data), ViolationList::new()),
            Err(DenormalizeError::Partial(partial)) => {
                let violations = violations_from_partial(&partial);
                (partial.data, violations)
            }
            Err(DenormalizeError::NotNormalizable(error)) => {
                (None, vec![violation_from_error(&error)])
            }
            Err(DenormalizeError::UnknownType(type_name)) => {
                return Err(BindingError::configuration(
                    error_codes::UNKNOWN_TYPE,
                    format!("Type '{}' is not registered", type_name),
                ));
            }
        };

        // Coercion failures are reported alone.
        if violations.is_empty() {
            if let Some(data) = instance.as_ref().filter(|data| !data.is_null()) {
                let groups = self.config.groups_for(request.method().as_str());
                violations = self.validator.validate(&target.type_name, data, &groups)?;
            }
        }

        let errors = build_error_tree(&violations);
        if !errors.is_empty() {
            return Ok(BindingOutcome::Rejected(errors));
        }
        Ok(BindingOutcome::Bound(BoundInstance::new(
            target.type_name.clone(),
            instance.unwrap_or(Value::Null),
        )))
    }
}

impl ValueResolver for RequestValueResolver {
    fn name(&self) -> &str {
        "request"
    }

    fn bind(
        &self,
        request: &dyn RequestSource,
        argument: &ArgumentMetadata,
    ) -> Result<BindingOutcome, BindingError> {
        RequestValueResolver::bind(self, request, argument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormDefinition, FormField};
    use crate::metadata::{FieldDescriptor, FieldKind, RequestDirective, TypeDescriptor};
    use crate::request::{HttpMethod, HttpRequest};
    use crate::validation::Constraint;
    use serde_json::json;

    fn resolver() -> RequestValueResolver {
        resolver_with(BindingConfig::default())
    }

    fn resolver_with(config: BindingConfig) -> RequestValueResolver {
        let types = Arc::new(
            TypeRegistry::new()
                .with(
                    TypeDescriptor::new("Signup")
                        .marker()
                        .field(
                            "name",
                            FieldDescriptor::new(FieldKind::String)
                                .constrain(Constraint::not_blank()),
                        )
                        .field(
                            "age",
                            FieldDescriptor::new(FieldKind::Integer).constrain(
                                Constraint::range(Some(18.0), None).in_groups(["POST"]),
                            ),
                        ),
                )
                .with(
                    TypeDescriptor::new("Newsletter")
                        .directive(RequestDirective::with_form("newsletter"))
                        .field(
                            "email",
                            FieldDescriptor::new(FieldKind::String)
                                .constrain(Constraint::email()),
                        ),
                )
                .with(TypeDescriptor::new("Session")),
        );
        let forms = FormRegistry::new(types.clone(), Arc::new(RuleValidator::new(types.clone())))
            .with(
                FormDefinition::new("newsletter", "newsletter")
                    .add(FormField::scalar("email", FieldKind::String)),
            );
        RequestValueResolver::standard(types, forms, config)
    }

    fn signup() -> ArgumentMetadata {
        ArgumentMetadata::new("signup", "Signup")
    }

    #[test]
    fn test_skips_without_reading_the_body() {
        let request = HttpRequest::new(HttpMethod::POST, "/")
            .with_body("application/json", "{not json");
        let outcome = resolver()
            .bind(&request, &ArgumentMetadata::new("session", "Session"))
            .unwrap();
        assert!(outcome.is_skipped());
    }

    #[test]
    fn test_direct_binding_from_query() {
        let request = HttpRequest::new(HttpMethod::GET, "/signup?name=x&age=12");
        let instance = resolver().resolve(&request, &signup()).unwrap().unwrap();
        assert_eq!(instance.type_name, "Signup");
        assert_eq!(instance.data, json!({"name": "x", "age": 12}));
    }

    #[test]
    fn test_method_group_applies() {
        let request = HttpRequest::new(HttpMethod::POST, "/signup")
            .with_json(json!({"name": "x", "age": 12}));
        match resolver().bind(&request, &signup()).unwrap() {
            BindingOutcome::Rejected(errors) => {
                assert_eq!(errors.messages("age"), ["This value should be 18 or more."]);
                assert_eq!(errors.message_count(), 1);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_coercion_failures_skip_validation() {
        let request = HttpRequest::new(HttpMethod::POST, "/signup")
            .with_json(json!({"name": "", "age": "abc"}));
        match resolver().bind(&request, &signup()).unwrap() {
            BindingOutcome::Rejected(errors) => {
                assert_eq!(
                    errors.messages("age"),
                    ["The type must be one of \"integer\" (\"string\" given)."]
                );
                assert!(errors.messages("name").is_empty());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_form_binding() {
        let resolver = resolver();
        let argument = ArgumentMetadata::new("subscription", "Newsletter");

        let valid = HttpRequest::new(HttpMethod::POST, "/")
            .with_body("application/x-www-form-urlencoded", "email=jane%40example.com");
        let instance = resolver.resolve(&valid, &argument).unwrap().unwrap();
        assert_eq!(instance.get("email"), Some(&json!("jane@example.com")));

        let invalid = HttpRequest::new(HttpMethod::POST, "/")
            .with_body("application/x-www-form-urlencoded", "email=nope&extra=1");
        match resolver.bind(&invalid, &argument).unwrap() {
            BindingOutcome::Rejected(errors) => {
                assert_eq!(
                    errors.messages("global"),
                    ["This form should not contain extra fields."]
                );
                assert_eq!(
                    errors.messages("email"),
                    ["This value is not a valid email address."]
                );
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_body_is_an_error() {
        let request = HttpRequest::new(HttpMethod::POST, "/")
            .with_body("application/json", "{not json");
        let error = resolver().bind(&request, &signup()).unwrap_err();
        assert_eq!(error.status_code(), 400);
    }

    #[test]
    fn test_missing_form_is_a_configuration_error() {
        let argument = ArgumentMetadata::new("signup", "Signup")
            .with_directive(RequestDirective::with_form("missing"));
        let request = HttpRequest::new(HttpMethod::GET, "/");
        let error = resolver().bind(&request, &argument).unwrap_err();
        assert_eq!(error.code(), error_codes::UNKNOWN_FORM);
    }

    #[test]
    fn test_config_reaches_form_binding() {
        let argument = ArgumentMetadata::new("subscription", "Newsletter");
        let request = HttpRequest::new(HttpMethod::GET, "/?email=jane%40example.com&extra=1");

        let strict = resolver().bind(&request, &argument).unwrap();
        assert!(matches!(strict, BindingOutcome::Rejected(_)));

        let relaxed = resolver_with(BindingConfig {
            allow_extra_form_fields: true,
            ..BindingConfig::default()
        });
        let instance = relaxed.resolve(&request, &argument).unwrap().unwrap();
        assert_eq!(instance.get("email"), Some(&json!("jane@example.com")));
    }

    #[test]
    fn test_config_group_reaches_form_validation() {
        let argument = ArgumentMetadata::new("subscription", "Newsletter");
        let request = HttpRequest::new(HttpMethod::GET, "/?email=nope");

        assert!(resolver().resolve(&request, &argument).is_err());

        let custom_group = resolver_with(BindingConfig {
            default_group: "Registration".to_string(),
            ..BindingConfig::default()
        });
        let instance = custom_group.resolve(&request, &argument).unwrap().unwrap();
        assert_eq!(instance.get("email"), Some(&json!("nope")));
    }
}
