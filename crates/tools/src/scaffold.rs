//! Laravel model scaffold tool.
//!
//! Parses a model description (`name:type[:nullable]` fields,
//! `relation:Model` relationships, companion list) into a
//! [`ScaffoldSpec`], invokes the external scaffolding command through a
//! [`ScaffoldRunner`], and returns a human-readable summary plus
//! suggested model code. All input problems come back as `Error:`
//! strings; only runner I/O failures are wrapped into a failure string
//! at the call site.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use cf_domain::config::ScaffoldConfig;
use cf_domain::error::{Error, Result};
use cf_domain::tool::{Tool, ToolDefinition};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Spec types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A fully parsed scaffold request, ready for the runner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldSpec {
    pub name: String,
    pub fields: Vec<FieldSpec>,
    pub companions: Vec<Companion>,
    pub relationships: Vec<RelationshipSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: String,
    pub nullable: bool,
}

/// Extra classes generated alongside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Companion {
    Migration,
    Factory,
    Seeder,
    Controller,
}

impl Companion {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "migration" => Some(Self::Migration),
            "factory" => Some(Self::Factory),
            "seeder" => Some(Self::Seeder),
            "controller" => Some(Self::Controller),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Migration => "migration",
            Self::Factory => "factory",
            Self::Seeder => "seeder",
            Self::Controller => "controller",
        }
    }

    /// The artisan-style flag passed to the scaffolding command.
    fn flag(&self) -> &'static str {
        match self {
            Self::Migration => "-m",
            Self::Factory => "-f",
            Self::Seeder => "-s",
            Self::Controller => "-c",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipSpec {
    pub kind: RelationKind,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsTo,
    BelongsToMany,
}

impl RelationKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hasone" => Some(Self::HasOne),
            "hasmany" => Some(Self::HasMany),
            "belongsto" => Some(Self::BelongsTo),
            "belongstomany" => Some(Self::BelongsToMany),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::HasOne => "hasOne",
            Self::HasMany => "hasMany",
            Self::BelongsTo => "belongsTo",
            Self::BelongsToMany => "belongsToMany",
        }
    }
}

/// Column types the migration grammar accepts.
const FIELD_TYPES: &[&str] = &[
    "string", "text", "integer", "biginteger", "boolean", "date", "datetime", "time",
    "timestamp", "decimal", "float", "double", "json", "uuid", "foreignid",
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Runner
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Executes the external scaffolding command for a parsed spec.
#[async_trait::async_trait]
pub trait ScaffoldRunner: Send + Sync {
    /// Run the command, returning its output. An `Ok` with empty output
    /// means nothing was executed (no command configured).
    async fn generate(&self, spec: &ScaffoldSpec) -> Result<String>;
}

/// Shells out to the configured scaffolding command (`sh -c`), appending
/// artisan-style arguments built from the spec.
pub struct CommandScaffoldRunner {
    config: ScaffoldConfig,
}

impl CommandScaffoldRunner {
    pub fn new(config: ScaffoldConfig) -> Self {
        Self { config }
    }

    fn arguments(spec: &ScaffoldSpec) -> String {
        let mut args = format!("make:model {}", spec.name);
        for companion in &spec.companions {
            args.push(' ');
            args.push_str(companion.flag());
        }
        args
    }
}

#[async_trait::async_trait]
impl ScaffoldRunner for CommandScaffoldRunner {
    async fn generate(&self, spec: &ScaffoldSpec) -> Result<String> {
        let Some(command) = self.config.command.as_deref() else {
            return Ok(String::new());
        };

        let full = format!("{command} {}", Self::arguments(spec));
        tracing::info!(command = %full, "running scaffold command");

        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(&full);
        if let Some(dir) = &self.config.workdir {
            cmd.current_dir(dir);
        }

        let output = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_sec),
            cmd.output(),
        )
        .await
        .map_err(|_| Error::Timeout(format!("scaffold command: {full}")))?
        .map_err(Error::Io)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Scaffold(format!(
                "command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Arguments & parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
struct ScaffoldArgs {
    name: String,
    fields: String,
    #[serde(default)]
    with: Option<String>,
    #[serde(default)]
    relationships: Option<String>,
}

fn pascal_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap())
}

fn snake_case_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap())
}

/// Parse the comma-separated `name:type[:nullable]` field grammar.
fn parse_fields(raw: &str) -> std::result::Result<Vec<FieldSpec>, String> {
    let mut fields = Vec::new();

    for spec in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let mut parts = spec.split(':').map(str::trim);
        let (name, kind) = match (parts.next(), parts.next()) {
            (Some(name), Some(kind)) if !name.is_empty() && !kind.is_empty() => (name, kind),
            _ => {
                return Err(format!(
                    "Error: Malformed field '{spec}'. Expected format name:type or \
                     name:type:nullable."
                ))
            }
        };

        if !snake_case_re().is_match(name) {
            return Err(format!("Error: Invalid field name '{name}'. Use snake_case."));
        }
        if !FIELD_TYPES.contains(&kind.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "Error: Unknown field type '{kind}' for field '{name}'. Supported types: \
                 string, text, integer, bigInteger, boolean, date, datetime, time, \
                 timestamp, decimal, float, double, json, uuid, foreignId."
            ));
        }

        let nullable = match parts.next() {
            None => false,
            Some(modifier) if modifier.eq_ignore_ascii_case("nullable") => true,
            Some(modifier) => {
                return Err(format!(
                    "Error: Unexpected modifier '{modifier}' for field '{name}'. Only \
                     'nullable' is supported."
                ))
            }
        };
        if parts.next().is_some() {
            return Err(format!(
                "Error: Malformed field '{spec}'. Expected format name:type or \
                 name:type:nullable."
            ));
        }

        fields.push(FieldSpec {
            name: name.to_owned(),
            kind: kind.to_owned(),
            nullable,
        });
    }

    if fields.is_empty() {
        return Err("Error: At least one field is required.".into());
    }
    Ok(fields)
}

/// Parse the comma-separated `relation:Model` relationship grammar.
fn parse_relationships(raw: &str) -> std::result::Result<Vec<RelationshipSpec>, String> {
    let mut relationships = Vec::new();

    for spec in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((kind, model)) = spec.split_once(':') else {
            return Err(format!(
                "Error: Malformed relationship '{spec}'. Expected format relation:Model \
                 (e.g. hasMany:Comment)."
            ));
        };
        let Some(kind) = RelationKind::parse(kind) else {
            return Err(format!(
                "Error: Unknown relationship type '{}'. Supported: hasOne, hasMany, \
                 belongsTo, belongsToMany.",
                kind.trim()
            ));
        };
        let model = model.trim();
        if !pascal_case_re().is_match(model) {
            return Err(format!("Error: Related model '{model}' must be in PascalCase."));
        }

        relationships.push(RelationshipSpec {
            kind,
            model: model.to_owned(),
        });
    }

    Ok(relationships)
}

fn parse_companions(raw: &str) -> std::result::Result<Vec<Companion>, String> {
    let mut companions = Vec::new();
    for spec in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some(companion) = Companion::parse(spec) else {
            return Err(format!(
                "Error: Unknown companion '{spec}'. Supported: migration, factory, seeder, \
                 controller."
            ));
        };
        if !companions.contains(&companion) {
            companions.push(companion);
        }
    }
    Ok(companions)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tool
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generates Laravel model scaffolding from a parsed description.
/// Touches no persistence of its own; the only side effect is the
/// external scaffolding command.
pub struct ScaffoldGenerationTool {
    runner: Arc<dyn ScaffoldRunner>,
}

impl ScaffoldGenerationTool {
    pub fn new(runner: Arc<dyn ScaffoldRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait::async_trait]
impl Tool for ScaffoldGenerationTool {
    fn name(&self) -> &'static str {
        "generate_laravel_model"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "generate_laravel_model".into(),
            description: "Generate a Laravel Eloquent model with optional migration, \
                          factory, seeder, controller, and relationships."
                .into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Model name in PascalCase (e.g. BlogPost)" },
                    "fields": {
                        "type": "string",
                        "description": "Comma-separated fields: name:type or name:type:nullable (e.g. title:string, body:text:nullable)"
                    },
                    "with": {
                        "type": "string",
                        "description": "Comma-separated companions: migration, factory, seeder, controller"
                    },
                    "relationships": {
                        "type": "string",
                        "description": "Comma-separated relationships: relation:Model (e.g. hasMany:Comment, belongsTo:User)"
                    }
                },
                "required": ["name", "fields"]
            }),
        }
    }

    async fn execute(&self, args: Value) -> String {
        let args: ScaffoldArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return format!("Error: Invalid arguments: {e}"),
        };

        let name = args.name.trim();
        if !pascal_case_re().is_match(name) {
            return "Error: Model name must be in PascalCase (e.g. BlogPost).".into();
        }

        let fields = match parse_fields(&args.fields) {
            Ok(f) => f,
            Err(e) => return e,
        };
        let companions = match parse_companions(args.with.as_deref().unwrap_or("")) {
            Ok(c) => c,
            Err(e) => return e,
        };
        let relationships =
            match parse_relationships(args.relationships.as_deref().unwrap_or("")) {
                Ok(r) => r,
                Err(e) => return e,
            };

        let spec = ScaffoldSpec {
            name: name.to_owned(),
            fields,
            companions,
            relationships,
        };

        let command_output = match self.runner.generate(&spec).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, model = %spec.name, "scaffold command failed");
                return format!("Error: Scaffold generation failed: {e}");
            }
        };

        render_summary(&spec, &command_output)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Output rendering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn render_summary(spec: &ScaffoldSpec, command_output: &str) -> String {
    let mut out = format!("Generated Laravel scaffolding for model {}.\n", spec.name);

    out.push_str("\nFields:\n");
    for field in &spec.fields {
        if field.nullable {
            out.push_str(&format!("- {}: {} (nullable)\n", field.name, field.kind));
        } else {
            out.push_str(&format!("- {}: {}\n", field.name, field.kind));
        }
    }

    if !spec.companions.is_empty() {
        let list: Vec<_> = spec.companions.iter().map(Companion::as_str).collect();
        out.push_str(&format!("\nIncludes: {}\n", list.join(", ")));
    }

    if !spec.relationships.is_empty() {
        out.push_str("\nRelationships:\n");
        for rel in &spec.relationships {
            out.push_str(&format!("- {} {}\n", rel.kind.as_str(), rel.model));
        }
    }

    if !command_output.is_empty() {
        out.push_str(&format!("\n{command_output}\n"));
    }

    out.push_str("\nSuggested model class:\n\n");
    out.push_str("```php\n");
    out.push_str(&suggested_model_code(spec));
    out.push_str("```");
    out
}

/// Render the Eloquent model class suggested by the parsed spec.
fn suggested_model_code(spec: &ScaffoldSpec) -> String {
    let fillable = spec
        .fields
        .iter()
        .map(|f| format!("'{}'", f.name))
        .collect::<Vec<_>>()
        .join(", ");

    let mut code = format!(
        "class {} extends Model\n{{\n    protected $fillable = [{}];\n",
        spec.name, fillable
    );

    for rel in &spec.relationships {
        let method = relation_method_name(rel);
        code.push_str(&format!(
            "\n    public function {method}()\n    {{\n        return $this->{}({}::class);\n    }}\n",
            rel.kind.as_str(),
            rel.model
        ));
    }

    code.push_str("}\n");
    code
}

/// Conventional accessor name: plural camelCase for *-many relations,
/// singular camelCase otherwise. Pluralization is naive (append `s`).
fn relation_method_name(rel: &RelationshipSpec) -> String {
    let mut method = String::with_capacity(rel.model.len() + 1);
    let mut chars = rel.model.chars();
    if let Some(first) = chars.next() {
        method.push(first.to_ascii_lowercase());
    }
    method.extend(chars);

    if matches!(rel.kind, RelationKind::HasMany | RelationKind::BelongsToMany) {
        method.push('s');
    }
    method
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
