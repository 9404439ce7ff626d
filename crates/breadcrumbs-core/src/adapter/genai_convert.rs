//! Conversion between breadcrumbs types and genai types
//!
//! Auth flows through the injected `SecretStore`, not genai's default env var
//! lookup, so the server and the CLI resolve keys the same way.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::{json, Value};

use crate::secrets::SecretStore;
use crate::types::{ChatMessage, MessageRole, ToolCallRequest, ToolDefinition};

use super::traits::ModelSettings;

// ============================================================================
// Message Conversion: breadcrumbs -> genai
// ============================================================================

/// Convert one history entry
pub fn to_genai_message(msg: &ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content.clone()),
        MessageRole::User => GenaiMessage::user(msg.content.clone()),
        MessageRole::Assistant if msg.has_tool_calls() => {
            // Only the calls are replayed; any preamble text in this turn is dropped.
            let calls: Vec<GenaiToolCall> = msg.tool_calls.iter().filter_map(to_genai_tool_call).collect();
            GenaiMessage::from(calls)
        }
        MessageRole::Assistant => GenaiMessage::assistant(msg.content.clone()),
        MessageRole::Tool => GenaiMessage::from(GenaiToolResponse::new(
            msg.tool_call_id.clone().unwrap_or_default(),
            msg.content.clone(),
        )),
    }
}

pub fn to_genai_messages(messages: &[ChatMessage]) -> Vec<GenaiMessage> {
    messages.iter().map(to_genai_message).collect()
}

/// Convert a tool call request back into genai's shape
///
/// Built through serde so optional fields added by newer genai releases keep
/// their defaults.
pub fn to_genai_tool_call(call: &ToolCallRequest) -> Option<GenaiToolCall> {
    let arguments = if call.arguments.trim().is_empty() {
        json!({})
    } else {
        serde_json::from_str(&call.arguments).unwrap_or_else(|_| Value::String(call.arguments.clone()))
    };
    serde_json::from_value(json!({
        "call_id": call.id,
        "fn_name": call.name,
        "fn_arguments": arguments,
    }))
    .ok()
}

// ============================================================================
// Tool Conversion: breadcrumbs -> genai
// ============================================================================

pub fn to_genai_tool(tool: &ToolDefinition) -> GenaiTool {
    GenaiTool::new(tool.name.clone())
        .with_description(tool.description.clone())
        .with_schema(tool.input_schema.clone())
}

pub fn to_genai_tools(tools: &[ToolDefinition]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion
// ============================================================================

pub fn to_genai_options(settings: &ModelSettings) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default()
        .with_capture_content(true)
        .with_capture_tool_calls(true);

    if let Some(temp) = settings.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }
    if let Some(max_tokens) = settings.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    genai_opts
}

// ============================================================================
// Response Conversion: genai -> breadcrumbs
// ============================================================================

/// Convert a completed genai tool call
///
/// Arguments stay an opaque string; they are decoded only when the tool runs.
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCallRequest {
    let arguments = match &tc.fn_arguments {
        Value::Null => String::new(),
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    };
    ToolCallRequest::new(tc.call_id.clone(), tc.fn_name.clone(), arguments)
}

// ============================================================================
// Provider Resolution
// ============================================================================

/// Providers genai speaks natively, with their adapter kind
pub fn native_adapter_kind(provider: &str) -> Option<AdapterKind> {
    match provider.to_lowercase().as_str() {
        "openai" => Some(AdapterKind::OpenAI),
        "anthropic" => Some(AdapterKind::Anthropic),
        "gemini" | "google" => Some(AdapterKind::Gemini),
        "ollama" => Some(AdapterKind::Ollama),
        "groq" => Some(AdapterKind::Groq),
        "xai" => Some(AdapterKind::Xai),
        "deepseek" => Some(AdapterKind::DeepSeek),
        "cohere" => Some(AdapterKind::Cohere),
        "fireworks" => Some(AdapterKind::Fireworks),
        "together" => Some(AdapterKind::Together),
        _ => None,
    }
}

/// OpenAI-compatible providers with a well-known endpoint
fn compatible_endpoint(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openrouter" => Some("https://openrouter.ai/api/v1/"),
        "mistral" => Some("https://api.mistral.ai/v1/"),
        _ => None,
    }
}

/// Default API base for a provider
pub fn default_api_base(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openai" => Some("https://api.openai.com/v1/"),
        "anthropic" => Some("https://api.anthropic.com/v1/"),
        "gemini" | "google" => Some("https://generativelanguage.googleapis.com/v1beta/"),
        "ollama" => Some("http://localhost:11434/"),
        "groq" => Some("https://api.groq.com/openai/v1/"),
        "xai" => Some("https://api.x.ai/v1/"),
        "deepseek" => Some("https://api.deepseek.com/"),
        "cohere" => Some("https://api.cohere.com/v2/"),
        "fireworks" => Some("https://api.fireworks.ai/inference/v1/"),
        "together" => Some("https://api.together.xyz/v1/"),
        other => compatible_endpoint(other),
    }
}

/// Whether the provider can be served (native, known-compatible, or a custom base)
pub fn is_supported(settings: &ModelSettings) -> bool {
    native_adapter_kind(&settings.provider).is_some()
        || compatible_endpoint(&settings.provider).is_some()
        || settings.api_base.is_some()
}

/// Whether the provider needs an API key
pub fn requires_api_key(provider: &str) -> bool {
    !matches!(provider.to_lowercase().as_str(), "ollama")
}

// ============================================================================
// Client Creation with Custom Auth
// ============================================================================

/// Create a genai Client bound to one provider
///
/// The model is always routed to the configured provider (never inferred
/// from the model name), and keys come from `settings.api_key` or the store.
pub fn create_client(settings: &ModelSettings, secrets: Arc<dyn SecretStore>) -> Client {
    let auth_provider = settings.provider.to_lowercase();
    let auth_explicit_key = settings.api_key.clone();

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let provider = auth_provider.clone();
            let explicit_key = auth_explicit_key.clone();
            let secrets = Arc::clone(&secrets);

            Box::pin(async move {
                if let Some(key) = explicit_key {
                    return Ok(Some(AuthData::from_single(key)));
                }
                // None lets genai handle keyless providers such as Ollama
                Ok(secrets.get(&provider).map(AuthData::from_single))
            })
        },
    );

    let target_provider = settings.provider.to_lowercase();
    let target_api_base = settings.api_base.clone();

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let adapter_kind = native_adapter_kind(&target_provider).unwrap_or(AdapterKind::OpenAI);
            let endpoint = match (&target_api_base, default_api_base(&target_provider)) {
                (Some(base), _) => Endpoint::from_owned(base.clone()),
                (None, Some(base)) => Endpoint::from_static(base),
                (None, None) => target.endpoint.clone(),
            };
            let model = ModelIden::new(adapter_kind, target.model.model_name.clone());

            Ok(ServiceTarget {
                endpoint,
                auth: target.auth,
                model,
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}
