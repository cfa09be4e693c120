use std::sync::OnceLock;

use tokenizers::Tokenizer;

use crate::server_config::cfg;

static TOKENIZER: OnceLock<Option<Tokenizer>> = OnceLock::new();

fn get_tokenizer() -> Option<&'static Tokenizer> {
    TOKENIZER
        .get_or_init(
            || match Tokenizer::from_pretrained(&cfg.model.tokenizer_id, None) {
                Ok(tokenizer) => Some(tokenizer),
                Err(e) => {
                    tracing::warn!(
                        tokenizer = %cfg.model.tokenizer_id,
                        "failed to load tokenizer, prompt size estimates disabled: {}",
                        e
                    );
                    None
                }
            },
        )
        .as_ref()
}

/// Load the tokenizer once per process, before the server starts accepting
/// requests. The model file is fetched from the hub on first use if it is
/// not already cached locally; a failed fetch downgrades token estimates to
/// "unavailable" instead of failing requests.
pub fn init() -> bool {
    get_tokenizer().is_some()
}

/// Estimated token count for a prompt, if the tokenizer is available.
pub fn token_count(text: &str) -> Option<usize> {
    let tokenizer = get_tokenizer()?;
    tokenizer
        .encode(text, false)
        .ok()
        .map(|encoding| encoding.get_ids().len())
}
