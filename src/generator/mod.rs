//! Generation Invoker
//!
//! Renders the prompt for one declaration, calls the expensive oracle tier
//! and extracts the documentation block and optional implementation notes.

pub mod extract;

pub use extract::{extract_doc_block, extract_notes};

use tracing::{debug, instrument, warn};

use crate::ai::prompt::{
    existing_content_section, implementation_notes_instructions, potential_exceptions_section,
};
use crate::ai::{
    LlmProvider, LlmRequest, Pricing, PromptContext, PromptTemplate, SharedProvider,
};
use crate::analyzer::body::potential_exceptions;
use crate::config::{GenerationConfig, TierConfig};
use crate::types::{DeclarationKind, DeclarationRecord, GeneratedDoc, Result, WeaveError};

pub struct DocGenerator {
    provider: SharedProvider,
    tier: TierConfig,
    temperature: f32,
    template: PromptTemplate,
    implementation_notes: bool,
    preserve_existing: bool,
}

impl DocGenerator {
    pub fn new(
        provider: SharedProvider,
        tier: TierConfig,
        temperature: f32,
        template: PromptTemplate,
    ) -> Self {
        Self {
            provider,
            tier,
            temperature,
            template,
            implementation_notes: true,
            preserve_existing: true,
        }
    }

    pub fn from_config(
        provider: SharedProvider,
        tier: TierConfig,
        temperature: f32,
        config: &GenerationConfig,
    ) -> Self {
        let template = PromptTemplate::load(config.prompt_dir.as_deref());
        Self::new(provider, tier, temperature, template)
            .with_implementation_notes(config.implementation_notes)
    }

    pub fn with_implementation_notes(mut self, enabled: bool) -> Self {
        self.implementation_notes = enabled;
        self
    }

    /// Offer existing documentation to the oracle for preservation
    pub fn with_preserve_existing(mut self, enabled: bool) -> Self {
        self.preserve_existing = enabled;
        self
    }

    /// Generate documentation, logging and swallowing any failure
    pub async fn generate(&self, decl: &DeclarationRecord, file_content: &str) -> Option<GeneratedDoc> {
        match self.try_generate(decl, file_content).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!("Error generating Javadoc for {}: {}", decl.name, e);
                None
            }
        }
    }

    #[instrument(skip_all, fields(item = %decl.label()))]
    pub async fn try_generate(
        &self,
        decl: &DeclarationRecord,
        file_content: &str,
    ) -> Result<GeneratedDoc> {
        let prompt = self.template.render(&self.prompt_context(decl, file_content));
        let request = LlmRequest::new(&self.tier.model, self.tier.max_tokens, prompt)
            .with_temperature(self.temperature);

        let response = self.provider.generate(&request).await?;
        if response.text.trim().is_empty() {
            return Err(WeaveError::generation(
                &decl.name,
                format!("{} returned an empty response", self.provider.name()),
            ));
        }

        let usage = Pricing::for_tier(&self.tier).record(&response.usage);
        let implementation_notes = if decl.kind.is_callable() && self.implementation_notes {
            extract_notes(&response.text)
        } else {
            None
        };
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            has_notes = implementation_notes.is_some(),
            "Generated documentation"
        );

        Ok(GeneratedDoc {
            documentation_text: extract_doc_block(&response.text),
            implementation_notes,
            usage,
        })
    }

    fn prompt_context(&self, decl: &DeclarationRecord, file_content: &str) -> PromptContext {
        let item_type = match &decl.kind {
            DeclarationKind::Type { form } => form.keyword(),
            kind => kind.label(),
        };
        let hints = if decl.kind.is_callable() {
            potential_exceptions(&decl.body_text)
        } else {
            Vec::new()
        };

        PromptContext {
            item_type: item_type.to_string(),
            item_name: decl.name.clone(),
            item_signature: decl.signature.clone(),
            modifiers: decl.modifier_string(),
            parameters: decl.parameter_string(),
            return_type: decl.return_type().unwrap_or_default().to_string(),
            implementation_code: decl.body_text.clone(),
            existing_content: existing_content_section(
                decl.existing_doc
                    .as_ref()
                    .filter(|_| self.preserve_existing)
                    .map(|d| d.raw_text.as_str()),
            ),
            java_content: file_content.to_string(),
            potential_exceptions: potential_exceptions_section(&hints),
            implementation_notes_instructions: implementation_notes_instructions(
                self.implementation_notes && decl.kind.is_callable(),
            ),
        }
    }
}
