//! Lookup of provider adapters by rating system

use crate::config::ProviderSettings;
use crate::error::{EngineError, EngineResult};
use crate::provider::adapter::RatingProvider;
use crate::provider::chesscom::ChesscomProvider;
use crate::provider::fide::FideProvider;
use crate::provider::http::build_client;
use crate::provider::lichess::LichessProvider;
use crate::provider::uscf::UscfProvider;
use crate::types::RatingSystem;
use std::sync::Arc;
use tracing::info;

/// One adapter slot per fetchable rating system
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    chesscom: Option<Arc<dyn RatingProvider>>,
    lichess: Option<Arc<dyn RatingProvider>>,
    fide: Option<Arc<dyn RatingProvider>>,
    uscf: Option<Arc<dyn RatingProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with live HTTP adapters for every provider
    pub fn from_settings(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let client = build_client(settings)?;

        let registry = Self::new()
            .register(Arc::new(ChesscomProvider::new(
                client.clone(),
                settings.chesscom_base_url.clone(),
            )))?
            .register(Arc::new(LichessProvider::new(
                client.clone(),
                settings.lichess_base_url.clone(),
            )))?
            .register(Arc::new(FideProvider::new(
                client.clone(),
                settings.fide_base_url.clone(),
            )))?
            .register(Arc::new(UscfProvider::new(
                client,
                settings.uscf_base_url.clone(),
            )))?;

        info!("Registered live rating providers");
        Ok(registry)
    }

    fn slot_mut(&mut self, system: RatingSystem) -> Option<&mut Option<Arc<dyn RatingProvider>>> {
        match system {
            RatingSystem::Chesscom => Some(&mut self.chesscom),
            RatingSystem::Lichess => Some(&mut self.lichess),
            RatingSystem::Fide => Some(&mut self.fide),
            RatingSystem::Uscf => Some(&mut self.uscf),
            RatingSystem::Custom => None,
        }
    }

    /// Register an adapter under the system it reports, replacing any previous one
    pub fn register(mut self, provider: Arc<dyn RatingProvider>) -> EngineResult<Self> {
        let system = provider.system();
        match self.slot_mut(system) {
            Some(slot) => {
                *slot = Some(provider);
                Ok(self)
            }
            None => Err(EngineError::ConfigurationError {
                message: format!("{} ratings are user-entered and cannot have a provider", system),
            }),
        }
    }

    /// Adapter for `system`; custom never has one
    pub fn get(&self, system: RatingSystem) -> Option<Arc<dyn RatingProvider>> {
        match system {
            RatingSystem::Chesscom => self.chesscom.clone(),
            RatingSystem::Lichess => self.lichess.clone(),
            RatingSystem::Fide => self.fide.clone(),
            RatingSystem::Uscf => self.uscf.clone(),
            RatingSystem::Custom => None,
        }
    }

    /// Systems with a registered adapter
    pub fn registered_systems(&self) -> Vec<RatingSystem> {
        RatingSystem::ALL
            .into_iter()
            .filter(|system| self.get(*system).is_some())
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("systems", &self.registered_systems())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::static_provider::StaticRatingProvider;

    #[test]
    fn test_register_and_lookup() {
        let registry = ProviderRegistry::new()
            .register(Arc::new(StaticRatingProvider::new(RatingSystem::Lichess)))
            .unwrap();

        assert!(registry.get(RatingSystem::Lichess).is_some());
        assert!(registry.get(RatingSystem::Fide).is_none());
        assert_eq!(registry.registered_systems(), vec![RatingSystem::Lichess]);
    }

    #[test]
    fn test_custom_cannot_be_registered() {
        let result = ProviderRegistry::new()
            .register(Arc::new(StaticRatingProvider::new(RatingSystem::Custom)));
        assert!(matches!(
            result,
            Err(EngineError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_live_registry_covers_every_fetchable_system() {
        let registry = ProviderRegistry::from_settings(&ProviderSettings::default()).unwrap();
        assert_eq!(
            registry.registered_systems(),
            vec![
                RatingSystem::Chesscom,
                RatingSystem::Lichess,
                RatingSystem::Fide,
                RatingSystem::Uscf
            ]
        );
        assert!(registry.get(RatingSystem::Custom).is_none());
    }
}
