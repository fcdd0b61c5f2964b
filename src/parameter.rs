//! Input parameters and record fields.
//!
//! A [`ParameterModel`] keeps the resolved type flattened onto itself
//! (`type`, `items`, `fields`, `symbols`, `typeName`) so authoring tools can
//! edit it through setters and get structural findings from [`validate`]
//! instead of hard failures.
//!
//! [`validate`]: ParameterModel::validate

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::binding::{BindingRule, ItemSeparator};
use crate::error::{ModelError, Result};
use crate::expression::{Evaluator, ExpressionContext, ValueFrom};
use crate::part::{prefixed, value_text, CommandLinePart, Origin, SortingKey, SynthesisContext};
use crate::resolver::{does_type_match, matching::runtime_type_name, resolve_type};
use crate::validation::{ArrayChecks, RecordChecks, Validation, ValidationPolicy};

static ID_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]*$").expect("id pattern is valid")
});

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParameterDecl {
    #[serde(default)]
    id: Option<String>,
    /// record fields carry a name instead of an id
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// v1.0 spelling of `description`, a string or a list of lines
    #[serde(default)]
    doc: Option<Value>,
    #[serde(default, rename = "type")]
    type_: Option<Value>,
    #[serde(default)]
    input_binding: Option<BindingRule>,
}

#[derive(Debug, Clone)]
pub struct ParameterModel {
    id: String,
    label: Option<String>,
    description: Option<String>,
    is_required: bool,
    is_field: bool,

    type_: Option<String>,
    items: Option<String>,
    /// binding declared inside `{type: "array", inputBinding: …}`
    items_binding: Option<BindingRule>,
    fields: Option<Vec<ParameterModel>>,
    symbols: Option<Vec<String>>,
    type_name: Option<String>,

    /// absent means "not on the command line"
    binding: Option<BindingRule>,

    loc: String,
    validation: Validation,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl ParameterModel {
    pub fn from_value(loc: impl Into<String>, decl: &Value) -> Result<Self> {
        let loc = loc.into();
        let decl: ParameterDecl = crate::path_de::from_value_with_path(decl)
            .map_err(|message| ModelError::InvalidDeclaration { loc: loc.clone(), message })?;

        let resolved = resolve_type(decl.type_.as_ref())?;

        let fields = match resolved.fields() {
            None => None,
            Some(decls) => Some(
                decls.iter()
                    .enumerate()
                    .map(|(i, field)| ParameterModel::from_value(format!("{loc}.fields[{i}]"), field))
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(ParameterModel {
            is_field: decl.name.is_some(),
            id: decl.id.or(decl.name).unwrap_or_default(),
            label: decl.label,
            description: decl.description.or_else(|| decl.doc.as_ref().and_then(doc_text)),
            is_required: resolved.is_required,
            type_: resolved.type_().map(str::to_string),
            items: resolved.items().map(str::to_string),
            items_binding: resolved.items_binding().cloned(),
            fields,
            symbols: resolved.symbols().map(<[String]>::to_vec),
            type_name: resolved.type_name().map(str::to_string),
            binding: decl.input_binding,
            loc,
            validation: Validation::new(),
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// COMMAND LINE
// ————————————————————————————————————————————————————————————————————————————

impl ParameterModel {
    /// Token for `value`, or `None` when the parameter has no binding or the
    /// value is undefined.
    pub fn command_part(
        &self,
        cx: &SynthesisContext<'_>,
        value: Option<&Value>,
        index: usize,
        origin: Origin,
    ) -> Result<Option<CommandLinePart>> {
        let (Some(binding), Some(value)) = (self.binding.as_ref(), value) else {
            return Ok(None);
        };
        let text = self.render(cx, binding, value)?;
        trace!(id = %self.id, %text, "command part");
        let key = SortingKey { position: binding.position(), index };
        Ok(Some(CommandLinePart::new(text, key, origin)))
    }

    fn render(&self, cx: &SynthesisContext<'_>, binding: &BindingRule, value: &Value) -> Result<String> {
        self.check_type(value)?;

        let prefix = binding.prefix();
        let separator = binding.separator();
        let items_prefix = self.items_binding.as_ref().map(BindingRule::prefix).unwrap_or("");

        match value {
            Value::Array(elements) => {
                let parts = elements.iter()
                    .map(|el| self.render(cx, binding, el))
                    .collect::<Result<Vec<_>>>()?;

                let text = match binding.item_separator.effective() {
                    // --prefix 1,2,3
                    ItemSeparator::Text(sep) => prefixed(prefix, separator, &parts.join(sep)),
                    // --prefix 1 --prefix 2 --prefix 3
                    ItemSeparator::Null => parts.iter()
                        .map(|part| prefixed(prefix, separator, part))
                        .collect::<Vec<_>>()
                        .join(" "),
                    ItemSeparator::Absent if self.items.as_deref() == Some("boolean") => {
                        let flags = parts.iter()
                            .filter(|p| !p.is_empty())
                            .map(String::as_str)
                            .collect::<Vec<_>>()
                            .join(" ");
                        prefixed(prefix, separator, &flags)
                    }
                    // --prefix [items_prefix] 1 [items_prefix] 2 ...
                    ItemSeparator::Absent => {
                        let item_sep = if binding.separate() { " " } else { "" };
                        let joiner = if items_prefix.is_empty() { "" } else { " " };
                        let joined = parts.iter()
                            .map(|part| format!("{items_prefix}{item_sep}{part}"))
                            .collect::<Vec<_>>()
                            .join(joiner);
                        prefixed(prefix, separator, joined.trim())
                    }
                };
                Ok(text)
            }
            Value::Object(map) if !is_file(map) => self.render_record(cx, map),
            Value::Bool(true) => {
                // booleans are flags: the prefix is the payload
                let prefix = if self.items.as_deref() == Some("boolean") { items_prefix } else { prefix };
                let empty_self = Value::String(String::new());
                let payload = self.resolve(cx, binding, &empty_self)?;
                Ok(prefixed(prefix, flag_separator(binding, prefix), &payload))
            }
            Value::Bool(false) => Ok(String::new()),
            scalar => {
                // array elements come through here; the caller already owns the prefix
                let prefix = if self.items.is_some() { "" } else { prefix };
                let payload = self.resolve(cx, binding, scalar)?;
                Ok(prefixed(prefix, flag_separator(binding, prefix), &payload))
            }
        }
    }

    fn render_record(&self, cx: &SynthesisContext<'_>, map: &Map<String, Value>) -> Result<String> {
        let mut tokens = Vec::new();
        for (i, field) in self.fields.iter().flatten().enumerate() {
            // child sort keys are dropped, the record keeps its own position
            if let Some(part) = field.command_part(cx, map.get(&field.id), i, Origin::Input)? {
                if !part.is_empty() {
                    tokens.push(part.value);
                }
            }
        }
        Ok(tokens.join(" "))
    }

    fn resolve(&self, cx: &SynthesisContext<'_>, binding: &BindingRule, self_: &Value) -> Result<String> {
        match &binding.value_from {
            Some(value_from) => {
                let out = value_from.evaluate(cx.evaluator, &cx.expression(self_))?;
                Ok(value_text(&out))
            }
            None => Ok(value_text(self_)),
        }
    }

    fn check_type(&self, value: &Value) -> Result<()> {
        if does_type_match(self.type_.as_deref(), value) {
            return Ok(());
        }
        if let Some(items) = self.items.as_deref() {
            if does_type_match(Some(items), value) {
                return Ok(());
            }
        }
        Err(ModelError::TypeMismatch {
            id: self.id.clone(),
            expected: self.type_.clone().unwrap_or_else(|| "undefined".to_string()),
            items: self.items.clone().unwrap_or_else(|| "undefined".to_string()),
            got: runtime_type_name(value).to_string(),
        })
    }
}

pub(crate) fn doc_text(doc: &Value) -> Option<String> {
    match doc {
        Value::String(s) => Some(s.clone()),
        Value::Array(lines) => Some(lines.iter().filter_map(Value::as_str).collect::<Vec<_>>().join("\n")),
        _ => None,
    }
}

fn is_file(map: &Map<String, Value>) -> bool {
    matches!(map.get("path"), Some(Value::String(p)) if !p.is_empty())
}

fn flag_separator(binding: &BindingRule, prefix: &str) -> &'static str {
    if !prefix.is_empty() && binding.separate() { " " } else { "" }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATION
// ————————————————————————————————————————————————————————————————————————————

impl ParameterModel {
    /// Run the structural checks and append the findings to this parameter's
    /// report. Earlier findings are kept. A failing `valueFrom` expression is
    /// an error, not a finding.
    pub fn validate(&mut self, evaluator: &dyn Evaluator, job: &Value, policy: ValidationPolicy) -> Result<&Validation> {
        self.validate_fresh(evaluator, job, policy)?;
        Ok(&self.validation)
    }

    /// Same as [`validate`](Self::validate) but hands this run's findings back
    /// so an owner can fold them into its own report.
    pub(crate) fn validate_fresh(&mut self, evaluator: &dyn Evaluator, job: &Value, policy: ValidationPolicy) -> Result<Validation> {
        let mut val = Validation::new();

        if let Some(binding) = &self.binding {
            if let Some(value_from) = &binding.value_from {
                if !matches!(value_from, ValueFrom::Expression(s) if s.trim().is_empty()) {
                    value_from.evaluate(evaluator, &ExpressionContext::new(job, &Value::Null))?;
                }
            }
            val.merge(binding.validate(&format!("{}.inputBinding", self.loc)));
        }

        self.check_id(&mut val);
        self.check_shape(&mut val, policy);
        // TODO: validate record fields recursively and check field name uniqueness

        if !val.is_empty() {
            debug!(loc = %self.loc, errors = val.errors.len(), warnings = val.warnings.len(), "parameter findings");
        }
        self.validation.merge(val.clone());
        Ok(val)
    }

    fn check_id(&self, val: &mut Validation) {
        let id_loc = format!("{}.id", self.loc);
        if self.id.is_empty() {
            val.error(id_loc, "ID must be set");
            return;
        }
        let bare = self.id.strip_prefix('#').unwrap_or(&self.id);
        if !ID_CHARS.is_match(bare) {
            val.error(id_loc, "ID can only contain alphanumeric and underscore characters");
        }
    }

    fn check_shape(&self, val: &mut Validation, policy: ValidationPolicy) {
        let loc = self.loc.as_str();
        let items = self.items.as_deref();

        match self.type_.as_deref() {
            Some("array") => {
                if self.items.is_none() {
                    val.error(loc, "Type array must have items");
                }
                let element_aware = policy.array_checks == ArrayChecks::ElementAware;
                if self.symbols.is_some() && !(element_aware && items == Some("enum")) {
                    val.error(loc, "Type array must not have symbols");
                }
                if self.fields.is_some() && !(element_aware && items == Some("record")) {
                    val.error(loc, "Type array must not have fields");
                }
            }
            Some("enum") => {
                if self.items.is_some() {
                    val.error(loc, "Type enum must not have items");
                }
                if self.symbols.is_none() {
                    val.error(loc, "Type enum must have symbols");
                }
                if self.fields.is_some() {
                    val.error(loc, "Type enum must not have fields");
                }
                if self.type_name.as_deref().unwrap_or("").is_empty() {
                    val.error(loc, "Type enum must have a name");
                }
            }
            _ => {}
        }

        match policy.record_checks {
            RecordChecks::Intended if self.type_.as_deref() == Some("record") => {
                if self.items.is_some() {
                    val.error(loc, "Type record must not have items");
                }
                if self.symbols.is_some() {
                    val.error(loc, "Type record must not have symbols");
                }
                if self.fields.is_none() {
                    val.error(loc, "Type record must have fields");
                }
                if self.type_name.as_deref().unwrap_or("").is_empty() {
                    val.error(loc, "Type record must have a name");
                }
            }
            // historical guard: the record block keyed on the enum discriminator
            RecordChecks::Literal if self.type_.as_deref() == Some("enum") => {
                if self.items.is_some() {
                    val.error(loc, "Type record must not have items");
                }
                if self.symbols.is_none() {
                    val.error(loc, "Type record must have symbols");
                }
                if self.fields.is_none() {
                    val.error(loc, "Type record must have fields");
                }
                if self.type_name.as_deref().unwrap_or("").is_empty() {
                    val.error(loc, "Type record must have a name");
                }
            }
            _ => {}
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESSORS & SETTERS
// ————————————————————————————————————————————————————————————————————————————

impl ParameterModel {
    pub fn id(&self) -> &str { &self.id }
    pub fn loc(&self) -> &str { &self.loc }
    pub fn is_required(&self) -> bool { self.is_required }
    pub fn is_field(&self) -> bool { self.is_field }
    pub fn validation(&self) -> &Validation { &self.validation }

    pub fn label(&self) -> Option<&str> { self.label.as_deref() }
    pub fn set_label(&mut self, label: impl Into<String>) { self.label = Some(label.into()); }

    pub fn description(&self) -> Option<&str> { self.description.as_deref() }
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn type_(&self) -> Option<&str> { self.type_.as_deref() }
    pub fn items(&self) -> Option<&str> { self.items.as_deref() }
    pub fn symbols(&self) -> Option<&[String]> { self.symbols.as_deref() }
    pub fn fields(&self) -> Option<&[ParameterModel]> { self.fields.as_deref() }
    pub fn type_name(&self) -> Option<&str> { self.type_name.as_deref() }
    pub fn items_binding(&self) -> Option<&BindingRule> { self.items_binding.as_ref() }
    pub fn binding(&self) -> Option<&BindingRule> { self.binding.as_ref() }

    /// Changing the category drops whatever the new one can't have.
    pub fn set_type(&mut self, type_: impl Into<String>) {
        let type_ = type_.into();
        match type_.as_str() {
            "array" => {
                self.symbols = None;
                self.fields = None;
            }
            "enum" => {
                self.items = None;
                self.fields = None;
            }
            "record" => {
                self.items = None;
                self.symbols = None;
            }
            _ => {}
        }
        self.type_ = Some(type_);
    }

    pub fn set_items(&mut self, items: impl Into<String>) -> Result<()> {
        if self.type_.as_deref() != Some("array") {
            return Err(ModelError::ItemsOnNonArray(self.type_.clone().unwrap_or_default()));
        }
        self.items = Some(items.into());
        Ok(())
    }

    fn accepts_fields(&self) -> Result<()> {
        if self.type_.as_deref() == Some("record") || self.items.as_deref() == Some("record") {
            return Ok(());
        }
        Err(ModelError::FieldsOnNonRecord {
            type_: self.type_.clone().unwrap_or_default(),
            items: self.items.clone().unwrap_or_default(),
        })
    }

    pub fn add_field(&mut self, field: ParameterModel) -> Result<()> {
        self.accepts_fields()?;
        let fields = self.fields.get_or_insert_with(Vec::new);
        if fields.iter().any(|f| f.id == field.id) {
            return Err(ModelError::DuplicateField(field.id));
        }
        fields.push(field);
        Ok(())
    }

    /// Build a field from its declaration and add it.
    pub fn add_field_decl(&mut self, decl: &Value) -> Result<()> {
        self.accepts_fields()?;
        let index = self.fields.as_ref().map_or(0, Vec::len);
        let field = ParameterModel::from_value(format!("{}.fields[{index}]", self.loc), decl)?;
        self.add_field(field)
    }

    pub fn remove_field(&mut self, id: &str) -> Result<ParameterModel> {
        let fields = self.fields.as_mut().ok_or_else(|| ModelError::MissingField(id.to_string()))?;
        let index = fields.iter()
            .position(|f| f.id == id)
            .ok_or_else(|| ModelError::MissingField(id.to_string()))?;
        Ok(fields.remove(index))
    }

    /// Only the precondition is checked; inserting symbols isn't supported.
    pub fn add_symbol(&mut self, _symbol: &str) -> Result<()> {
        if self.type_.as_deref() != Some("enum") && self.items.as_deref() != Some("enum") {
            return Err(ModelError::SymbolsOnNonEnum);
        }
        Err(ModelError::Unsupported("adding enum symbols"))
    }

    /// Creates an empty binding first if there is none.
    pub fn set_value_from(&mut self, value_from: ValueFrom) {
        self.binding.get_or_insert_with(BindingRule::default).value_from = Some(value_from);
    }

    pub fn value_from(&self) -> Option<&ValueFrom> {
        self.binding.as_ref().and_then(|b| b.value_from.as_ref())
    }

    pub fn has_input_binding(&self) -> bool { self.binding.is_some() }

    pub fn set_input_binding(&mut self, binding: BindingRule) { self.binding = Some(binding); }

    pub fn remove_input_binding(&mut self) { self.binding = None; }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::JaqEvaluator;
    use serde_json::json;

    fn param(decl: Value) -> ParameterModel {
        ParameterModel::from_value("inputs[0]", &decl).unwrap()
    }

    fn token(p: &ParameterModel, job: &Value, value: Value) -> Option<String> {
        let cx = SynthesisContext::new(job, &JaqEvaluator);
        p.command_part(&cx, Some(&value), 0, Origin::Input).unwrap().map(|part| part.value)
    }

    fn findings(p: &mut ParameterModel, policy: ValidationPolicy) -> Vec<String> {
        let report = p.validate(&JaqEvaluator, &json!({}), policy).unwrap();
        report.errors.iter().map(|e| e.message.clone()).collect()
    }

    // ---- construction ----

    #[test]
    fn flattens_resolved_type() {
        let p = param(json!({"id": "#reads", "type": "File[]?", "label": "Reads"}));
        assert_eq!(p.id(), "#reads");
        assert_eq!(p.type_(), Some("array"));
        assert_eq!(p.items(), Some("File"));
        assert!(!p.is_required());
        assert!(!p.is_field());
        assert_eq!(p.label(), Some("Reads"));
        assert!(!p.has_input_binding());
    }

    #[test]
    fn record_fields_become_child_models() {
        let p = param(json!({
            "id": "pair",
            "type": {"type": "record", "name": "Pair", "fields": [
                {"name": "left", "type": "int", "inputBinding": {"prefix": "-l"}},
                {"name": "right", "type": "int"}
            ]}
        }));
        let fields = p.fields().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].id(), "left");
        assert!(fields[0].is_field());
        assert_eq!(fields[1].loc(), "inputs[0].fields[1]");
    }

    #[test]
    fn malformed_binding_reports_its_path() {
        let err = ParameterModel::from_value("inputs[3]", &json!({"id": "x", "inputBinding": {"separate": "no"}}))
            .unwrap_err();
        match err {
            ModelError::InvalidDeclaration { loc, message } => {
                assert_eq!(loc, "inputs[3]");
                assert!(message.contains("inputBinding"), "{message}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // ---- inclusion gate ----

    #[test]
    fn no_binding_or_undefined_value_is_omitted() {
        let job = json!({});
        let cx = SynthesisContext::new(&job, &JaqEvaluator);
        let unbound = param(json!({"id": "a", "type": "string"}));
        assert!(unbound.command_part(&cx, Some(&json!("x")), 0, Origin::Input).unwrap().is_none());

        let bound = param(json!({"id": "a", "type": "int", "inputBinding": {"prefix": "-a"}}));
        assert!(bound.command_part(&cx, None, 0, Origin::Input).unwrap().is_none());
    }

    // ---- synthesis ----

    #[test]
    fn scalar_with_prefix() {
        let p = param(json!({"id": "name", "type": "string", "inputBinding": {"prefix": "--name", "position": 1}}));
        assert_eq!(token(&p, &json!({}), json!("world")).as_deref(), Some("--name world"));

        let p = param(json!({"id": "n", "type": "int", "inputBinding": {"prefix": "-n", "separate": false}}));
        assert_eq!(token(&p, &json!({}), json!(5)).as_deref(), Some("-n5"));
    }

    #[test]
    fn array_item_separators() {
        let joined = param(json!({"id": "a", "type": "int[]", "inputBinding": {"prefix": "-a", "itemSeparator": ","}}));
        assert_eq!(token(&joined, &json!({}), json!([1, 2, 3])).as_deref(), Some("-a 1,2,3"));

        let repeated = param(json!({"id": "a", "type": "int[]", "inputBinding": {"prefix": "-a", "itemSeparator": null}}));
        assert_eq!(token(&repeated, &json!({}), json!([1, 2, 3])).as_deref(), Some("-a 1 -a 2 -a 3"));

        let grouped = param(json!({"id": "a", "type": "int[]", "inputBinding": {"prefix": "-a"}}));
        assert_eq!(token(&grouped, &json!({}), json!([1, 2, 3])).as_deref(), Some("-a 1 2 3"));
    }

    #[test]
    fn array_with_items_prefix() {
        let p = param(json!({
            "id": "inputs",
            "type": {"type": "array", "items": "File", "inputBinding": {"prefix": "-I"}},
            "inputBinding": {"prefix": "--in"}
        }));
        let v = json!([{"class": "File", "path": "/a.bam"}, {"class": "File", "path": "/b.bam"}]);
        assert_eq!(token(&p, &json!({}), v).as_deref(), Some("--in -I /a.bam -I /b.bam"));
    }

    #[test]
    fn boolean_flags() {
        let p = param(json!({"id": "f", "type": "boolean", "inputBinding": {"prefix": "--flag"}}));
        assert_eq!(token(&p, &json!({}), json!(true)).as_deref(), Some("--flag"));
        assert_eq!(token(&p, &json!({}), json!(false)).as_deref(), Some(""));
    }

    #[test]
    fn boolean_array_uses_items_prefix() {
        let p = param(json!({
            "id": "v",
            "type": {"type": "array", "items": "boolean", "inputBinding": {"prefix": "-v"}},
            "inputBinding": {"prefix": "--verbosity"}
        }));
        assert_eq!(token(&p, &json!({}), json!([true, false, true])).as_deref(), Some("--verbosity -v -v"));
    }

    #[test]
    fn record_value_flattens_children() {
        let p = param(json!({
            "id": "pair",
            "type": {"type": "record", "name": "Pair", "fields": [
                {"name": "left", "type": "int", "inputBinding": {"prefix": "-l"}},
                {"name": "skip", "type": "int"},
                {"name": "right", "type": "int", "inputBinding": {"prefix": "-r"}}
            ]},
            "inputBinding": {"position": 2}
        }));
        assert_eq!(token(&p, &json!({}), json!({"left": 1, "skip": 9, "right": 2})).as_deref(), Some("-l 1 -r 2"));
        assert_eq!(token(&p, &json!({}), json!({"right": 2})).as_deref(), Some("-r 2"));
    }

    #[test]
    fn file_unwraps_to_path() {
        let p = param(json!({"id": "ref", "type": "File", "inputBinding": {"prefix": "-R"}}));
        assert_eq!(token(&p, &json!({}), json!({"class": "File", "path": "/ref.fa"})).as_deref(), Some("-R /ref.fa"));
    }

    #[test]
    fn value_from_sees_job_and_self() {
        let p = param(json!({
            "id": "out",
            "type": "string",
            "inputBinding": {"prefix": "-o", "valueFrom": "$(.self + \".\" + .job.ext)"}
        }));
        assert_eq!(token(&p, &json!({"ext": "bam"}), json!("sample")).as_deref(), Some("-o sample.bam"));
    }

    #[test]
    fn mismatched_value_is_fatal() {
        let p = param(json!({"id": "n", "type": "int", "inputBinding": {}}));
        let job = json!({});
        let cx = SynthesisContext::new(&job, &JaqEvaluator);
        let err = p.command_part(&cx, Some(&json!("five")), 0, Origin::Input).unwrap_err();
        assert!(matches!(err, ModelError::TypeMismatch { ref id, ref got, .. } if id == "n" && got == "string"));
    }

    #[test]
    fn sorting_key_uses_position_and_index() {
        let p = param(json!({"id": "x", "type": "string", "inputBinding": {"position": 4}}));
        let job = json!({});
        let cx = SynthesisContext::new(&job, &JaqEvaluator);
        let part = p.command_part(&cx, Some(&json!("v")), 7, Origin::Argument).unwrap().unwrap();
        assert_eq!(part.sorting_key, SortingKey { position: 4, index: 7 });
        assert_eq!(part.origin, Origin::Argument);
    }

    // ---- validation ----

    #[test]
    fn id_rules() {
        let mut p = param(json!({"type": "string"}));
        assert_eq!(findings(&mut p, ValidationPolicy::default()), vec!["ID must be set"]);
        assert_eq!(p.validation().errors[0].loc, "inputs[0].id");

        let mut p = param(json!({"id": "bad-id", "type": "string"}));
        assert_eq!(
            findings(&mut p, ValidationPolicy::default()),
            vec!["ID can only contain alphanumeric and underscore characters"]
        );

        let mut p = param(json!({"id": "#good_id", "type": "string"}));
        assert!(findings(&mut p, ValidationPolicy::default()).is_empty());
    }

    #[test]
    fn enum_needs_name_and_symbols() {
        let mut p = param(json!({"id": "e", "type": {"type": "enum"}}));
        let errs = findings(&mut p, ValidationPolicy::default());
        assert_eq!(errs, vec!["Type enum must have symbols", "Type enum must have a name"]);
    }

    #[test]
    fn array_without_items() {
        let mut p = param(json!({"id": "a", "type": {"type": "array"}}));
        assert_eq!(findings(&mut p, ValidationPolicy::default()), vec!["Type array must have items"]);

    }

    #[test]
    fn array_checks_policy() {
        let strict = ValidationPolicy::default();
        let aware = ValidationPolicy { array_checks: ArrayChecks::ElementAware, ..Default::default() };
        let enums = json!({"id": "a", "type": {"type": "array", "items": {"type": "enum", "name": "E", "symbols": ["x"]}}});
        let records = json!({"id": "a", "type": {"type": "array", "items": {
            "type": "record", "name": "R", "fields": [{"name": "f", "type": "int"}]
        }}});

        assert_eq!(findings(&mut param(enums.clone()), strict), vec!["Type array must not have symbols"]);
        assert_eq!(findings(&mut param(records.clone()), strict), vec!["Type array must not have fields"]);
        assert!(findings(&mut param(enums), aware).is_empty());
        assert!(findings(&mut param(records), aware).is_empty());
    }

    #[test]
    fn record_checks_policy() {
        let intended = ValidationPolicy { record_checks: RecordChecks::Intended, ..Default::default() };
        let literal = ValidationPolicy { record_checks: RecordChecks::Literal, ..Default::default() };

        let mut rec = param(json!({"id": "r", "type": {"type": "record"}}));
        assert_eq!(
            findings(&mut rec, intended),
            vec!["Type record must have fields", "Type record must have a name"]
        );
        let mut rec = param(json!({"id": "r", "type": {"type": "record"}}));
        assert!(findings(&mut rec, literal).is_empty());

        // the literal guard fires on a perfectly good enum
        let mut en = param(json!({"id": "e", "type": {"type": "enum", "name": "E", "symbols": ["a"]}}));
        assert_eq!(findings(&mut en, literal), vec!["Type record must have fields"]);
        let mut en = param(json!({"id": "e", "type": {"type": "enum", "name": "E", "symbols": ["a"]}}));
        assert!(findings(&mut en, intended).is_empty());
    }

    #[test]
    fn validation_accumulates() {
        let mut p = param(json!({"type": "string", "inputBinding": {"prefix": "a b"}}));
        p.validate(&JaqEvaluator, &json!({}), ValidationPolicy::default()).unwrap();
        let report = p.validate(&JaqEvaluator, &json!({}), ValidationPolicy::default()).unwrap();
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].loc, "inputs[0].inputBinding.prefix");
    }

    #[test]
    fn broken_value_from_is_fatal_during_validation() {
        let mut p = param(json!({"id": "x", "type": "string", "inputBinding": {"valueFrom": "$(.job.[)"}}));
        assert!(matches!(
            p.validate(&JaqEvaluator, &json!({}), ValidationPolicy::default()),
            Err(ModelError::Expression(_))
        ));
    }

    // ---- setters ----

    #[test]
    fn set_type_clears_incompatible_parts() {
        let mut p = param(json!({"id": "e", "type": {"type": "enum", "name": "E", "symbols": ["a"]}}));
        p.set_type("array");
        assert!(p.symbols().is_none());
        assert!(p.set_items("string").is_ok());
        p.set_type("string");
        assert!(matches!(p.set_items("int"), Err(ModelError::ItemsOnNonArray(_))));
    }

    #[test]
    fn field_mutation() {
        let mut p = param(json!({"id": "r", "type": {"type": "record", "name": "R", "fields": [{"name": "a", "type": "int"}]}}));
        p.add_field_decl(&json!({"name": "b", "type": "string"})).unwrap();
        assert_eq!(p.fields().unwrap()[1].loc(), "inputs[0].fields[1]");
        assert!(matches!(
            p.add_field_decl(&json!({"name": "a", "type": "int"})),
            Err(ModelError::DuplicateField(id)) if id == "a"
        ));
        assert_eq!(p.remove_field("a").unwrap().id(), "a");
        assert!(matches!(p.remove_field("a"), Err(ModelError::MissingField(_))));

        let mut s = param(json!({"id": "s", "type": "string"}));
        assert!(matches!(s.add_field_decl(&json!({"name": "x"})), Err(ModelError::FieldsOnNonRecord { .. })));
    }

    #[test]
    fn add_symbol_is_unsupported() {
        let mut s = param(json!({"id": "s", "type": "string"}));
        assert!(matches!(s.add_symbol("x"), Err(ModelError::SymbolsOnNonEnum)));
        let mut e = param(json!({"id": "e", "type": {"type": "enum", "name": "E", "symbols": ["a"]}}));
        assert!(matches!(e.add_symbol("b"), Err(ModelError::Unsupported(_))));
        assert_eq!(e.symbols().unwrap().len(), 1);
    }

    #[test]
    fn set_value_from_creates_binding() {
        let mut p = param(json!({"id": "x", "type": "string"}));
        p.set_value_from(ValueFrom::Literal("fixed".into()));
        assert!(p.has_input_binding());
        assert_eq!(token(&p, &json!({}), json!("ignored")).as_deref(), Some("fixed"));
        p.remove_input_binding();
        assert!(p.value_from().is_none());
    }
}
