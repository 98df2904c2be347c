//! Rendering: bind the option store and composer into the template and
//! produce the final document text.
//!
//! Rendering is a pure function of (template, store, composer) — no I/O, no
//! hidden state — so the same inputs always yield byte-identical output.
//! Validation runs first; substitution only starts on a consistent store.

use tracing::debug;

use crate::compose::Composer;
use crate::error::BootfigError;
use crate::options::OptionStore;
use crate::template;
use crate::validate;

pub(crate) fn render(
    template_text: &str,
    options: &OptionStore,
    composer: &Composer,
) -> Result<String, BootfigError> {
    validate::check(options)?;

    let mut bindings = options.bindings();
    bindings.extend(composer.bindings());
    debug!(bindings = bindings.len(), "rendering bootstrap document");

    template::substitute(template_text, &bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_renders_default_template() {
        let text = render(
            template::DEFAULT_TEMPLATE,
            &OptionStore::default(),
            &Composer::default(),
        )
        .unwrap();
        assert!(text.contains("connect_timeout: 30s"));
        assert!(!text.contains("#{"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let options = OptionStore::default();
        let composer = Composer::default();
        let first = render(template::DEFAULT_TEMPLATE, &options, &composer).unwrap();
        let second = render(template::DEFAULT_TEMPLATE, &options, &composer).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn placeholder_family_fills_every_site() {
        // connect_timeout appears in both the stats and base clusters.
        let text = render(
            template::DEFAULT_TEMPLATE,
            &OptionStore::default(),
            &Composer::default(),
        )
        .unwrap();
        assert_eq!(text.matches("connect_timeout: 30s").count(), 2);
    }

    #[test]
    fn overridden_template_with_unknown_marker_fails_closed() {
        let err = render(
            "#{template_that_i_will_not_fill}\n",
            &OptionStore::default(),
            &Composer::default(),
        )
        .unwrap_err();
        match err {
            BootfigError::UnresolvedTemplate(keys) => {
                assert_eq!(keys, vec!["template_that_i_will_not_fill".to_string()]);
            }
            other => panic!("Expected UnresolvedTemplate, got {other:?}"),
        }
    }

    #[test]
    fn validation_failure_preempts_rendering() {
        let mut options = OptionStore::default();
        options.rtds = Some(crate::options::RtdsLayer {
            name: "layer".into(),
            initial_fetch_timeout_seconds: 5,
        });
        let err = render(template::DEFAULT_TEMPLATE, &options, &Composer::default()).unwrap_err();
        assert!(matches!(err, BootfigError::MissingDependency(_)));
    }
}
