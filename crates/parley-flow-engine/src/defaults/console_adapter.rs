//! Console transport adapter.

use async_trait::async_trait;

use crate::errors::AdapterError;
use crate::traits::ChatAdapter;

/// Adapter that writes outbound messages to stdout. Useful for local runs
/// and demos.
pub struct ConsoleAdapter;

#[async_trait]
impl ChatAdapter for ConsoleAdapter {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_message(
        &self,
        conversation_id: &str,
        message: &str,
    ) -> Result<(), AdapterError> {
        println!("[{conversation_id}] {message}");
        Ok(())
    }
}
