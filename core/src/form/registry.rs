use super::definition::FormDefinition;
use super::tree::Form;
use super::{FormFactory, FormHandle};
use crate::config::BindingConfig;
use crate::errors::{error_codes, BindingError};
use crate::metadata::{TypeIntrospector, TypeRegistry};
use crate::validation::{ConstraintValidator, DEFAULT_GROUP};
use std::collections::HashMap;
use std::sync::Arc;

/// Form definitions keyed by id. Every created form is a fresh instance.
pub struct FormRegistry {
    forms: HashMap<String, FormDefinition>,
    types: Arc<TypeRegistry>,
    validator: Arc<dyn ConstraintValidator>,
    validation_group: String,
    allow_extra_fields: bool,
}

impl FormRegistry {
    pub fn new(types: Arc<TypeRegistry>, validator: Arc<dyn ConstraintValidator>) -> Self {
        Self {
            forms: HashMap::new(),
            types,
            validator,
            validation_group: DEFAULT_GROUP.to_string(),
            allow_extra_fields: false,
        }
    }

    /// Applies the form-related settings of `config`.
    pub fn with_config(mut self, config: &BindingConfig) -> Self {
        self.validation_group = config.default_group.clone();
        self.allow_extra_fields = config.allow_extra_form_fields;
        self
    }

    pub fn register(&mut self, definition: FormDefinition) {
        if self.forms.contains_key(&definition.id) {
            log::warn!("form '{}' registered twice", definition.id);
        }
        self.forms.insert(definition.id.clone(), definition);
    }

    pub fn with(mut self, definition: FormDefinition) -> Self {
        self.register(definition);
        self
    }

    pub fn contains(&self, form_id: &str) -> bool {
        self.forms.contains_key(form_id)
    }
}

impl FormFactory for FormRegistry {
    fn create_form(
        &self,
        form_id: &str,
        data_class: &str,
    ) -> Result<Box<dyn FormHandle>, BindingError> {
        let definition = self.forms.get(form_id).ok_or_else(|| {
            BindingError::configuration(
                error_codes::UNKNOWN_FORM,
                format!("Form '{}' is not registered", form_id),
            )
        })?;
        let descriptor = self.types.describe(data_class).ok_or_else(|| {
            BindingError::configuration(
                error_codes::UNKNOWN_TYPE,
                format!("Type '{}' is not registered", data_class),
            )
        })?;

        let allow_extra = definition
            .allow_extra_fields
            .unwrap_or(self.allow_extra_fields);
        Ok(Box::new(Form::build(
            definition,
            descriptor,
            self.validator.clone(),
            vec![self.validation_group.clone()],
            allow_extra,
        )))
    }
}
