//! Cross-option validation, run as a strictly prior phase before any
//! substitution so a failing configuration never produces even a partially
//! rendered document.
//!
//! Checks run independently and the first failure is returned; failures are
//! not aggregated. Mutually exclusive template branches (platform
//! certificate validation vs. the static trust bundle) are selected by a
//! single boolean in the option store, so exactly one branch is rendered by
//! construction and needs no runtime check here.

use crate::error::BootfigError;
use crate::options::OptionStore;

/// Validate cross-option consistency of the store.
///
/// An RTDS layer pulls dynamic runtime configuration over the ADS channel,
/// so configuring one without an ADS endpoint can never work.
pub(crate) fn check(options: &OptionStore) -> Result<(), BootfigError> {
    if options.rtds.is_some() && options.ads.is_none() {
        return Err(BootfigError::MissingDependency(
            "RTDS requires ADS".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{AdsEndpoint, RtdsLayer};

    #[test]
    fn default_store_passes() {
        assert!(check(&OptionStore::default()).is_ok());
    }

    #[test]
    fn rtds_without_ads_fails() {
        let mut store = OptionStore::default();
        store.rtds = Some(RtdsLayer {
            name: "some_rtds_layer".into(),
            initial_fetch_timeout_seconds: 5,
        });
        let err = check(&store).unwrap_err();
        match err {
            BootfigError::MissingDependency(detail) => {
                assert_eq!(detail, "RTDS requires ADS");
            }
            other => panic!("Expected MissingDependency, got {other:?}"),
        }
    }

    #[test]
    fn rtds_with_ads_passes() {
        let mut store = OptionStore::default();
        store.rtds = Some(RtdsLayer {
            name: "some_rtds_layer".into(),
            initial_fetch_timeout_seconds: 5,
        });
        store.ads = Some(AdsEndpoint {
            host: "ads.example.com".into(),
            port: 18000,
        });
        assert!(check(&store).is_ok());
    }

    #[test]
    fn ads_without_rtds_passes() {
        let mut store = OptionStore::default();
        store.ads = Some(AdsEndpoint {
            host: "ads.example.com".into(),
            port: 18000,
        });
        assert!(check(&store).is_ok());
    }
}
