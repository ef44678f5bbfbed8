// src/common/revalidate.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

/// Aviso de que as páginas que exibem uma entidade precisam recarregar.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invalidation {
    pub entity: &'static str,
    pub pages: Vec<&'static str>,
    pub at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Revalidator {
    tx: broadcast::Sender<Invalidation>,
}

impl Revalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, entity: &'static str, pages: &[&'static str]) {
        let event = Invalidation { entity, pages: pages.to_vec(), at: Utc::now() };
        // Sem assinantes o envio falha, e tudo bem: ninguém está olhando a tela.
        match self.tx.send(event) {
            Ok(receivers) => tracing::debug!("🔄 {} invalidado para {} ouvinte(s)", entity, receivers),
            Err(_) => tracing::trace!("{} invalidado sem ouvintes", entity),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.tx.subscribe()
    }
}
