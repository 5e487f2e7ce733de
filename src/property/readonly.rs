//! Property<V>: read-only facade over a constant, a captured property, or a
//! stream-composed cache.

use std::fmt;
use std::sync::Arc;

use crate::config::ComposeConfig;
use crate::error::Result;
use crate::stream::{Disposable, Stream};

use super::composed::Composed;
use super::traits::ObservableProperty;

enum Source<V> {
    Constant(V),
    /// Holds the wrapped property strongly.
    Captured(Arc<dyn ObservableProperty<V>>),
    Composed(Composed<V>),
}

impl<V: Clone> Clone for Source<V> {
    fn clone(&self) -> Self {
        match self {
            Source::Constant(v) => Source::Constant(v.clone()),
            Source::Captured(p) => Source::Captured(p.clone()),
            Source::Composed(c) => Source::Composed(c.clone()),
        }
    }
}

/// Read-only observable value.
///
/// An instance is exactly one of: a constant, a capture of another property
/// (kept alive by this one), or a cache composed from a stream (which keeps
/// only the upstream subscription alive, not the property that produced it).
pub struct Property<V> {
    source: Source<V>,
}

impl<V: Clone> Clone for Property<V> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> Property<V> {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// A property that always holds `value`.
    pub fn constant(value: V) -> Self {
        Self {
            source: Source::Constant(value),
        }
    }

    /// Wrap `source`, keeping it alive for as long as this property lives.
    pub fn capture(source: impl ObservableProperty<V> + 'static) -> Self {
        Self {
            source: Source::Captured(Arc::new(source)),
        }
    }

    /// Cache `source` through its stream without retaining `source` itself.
    pub fn compose(source: &impl ObservableProperty<V>) -> Result<Self> {
        Self::compose_with(source, ComposeConfig::default())
    }

    /// [`compose`](Self::compose) with explicit configuration.
    pub fn compose_with(source: &impl ObservableProperty<V>, config: ComposeConfig) -> Result<Self> {
        Self::from_stream_with(source.stream(), config)
    }

    /// Cache the latest value of `stream`.
    ///
    /// `stream` must deliver at least one value while being subscribed;
    /// otherwise [`PropertyError::NoInitialValue`](crate::PropertyError::NoInitialValue)
    /// is returned and the subscription is torn down.
    pub fn from_stream(stream: Stream<V>) -> Result<Self> {
        Self::from_stream_with(stream, ComposeConfig::default())
    }

    /// [`from_stream`](Self::from_stream) with explicit configuration.
    pub fn from_stream_with(stream: Stream<V>, config: ComposeConfig) -> Result<Self> {
        let composed = Composed::new(&stream, &config)?;
        Ok(Self {
            source: Source::Composed(composed),
        })
    }

    /// Start at `initial`, then follow `values`.
    pub fn with_initial(initial: V, values: Stream<V>) -> Self {
        Self {
            source: Source::Composed(Composed::seeded(
                initial,
                &values,
                &ComposeConfig::default(),
            )),
        }
    }

    /// A composed property holding `f` applied to this property's value.
    ///
    /// # Panics
    ///
    /// When this property captures an [`ObservableProperty`] whose stream does
    /// not deliver its current value on subscribe. Use
    /// [`from_stream`](Self::from_stream) over `self.stream().map(f)` to get a
    /// `Result` instead.
    #[track_caller]
    pub fn map<U: Clone + Send + Sync + 'static>(
        &self,
        f: impl Fn(&V) -> U + Send + Sync + 'static,
    ) -> Property<U> {
        if let Source::Constant(value) = &self.source {
            return Property::constant(f(value));
        }
        Property::from_stream(self.stream().map(f))
            .expect("property streams deliver their current value on subscribe")
    }

    // -----------------------------------------------------------------------
    // Access
    // -----------------------------------------------------------------------

    /// The current value.
    pub fn value(&self) -> V {
        match &self.source {
            Source::Constant(value) => value.clone(),
            Source::Captured(inner) => inner.value(),
            Source::Composed(composed) => composed.value(),
        }
    }

    /// Current value followed by every change.
    ///
    /// For a constant this is a single value. For a captured property the
    /// stream keeps the captured property alive while subscribed.
    pub fn stream(&self) -> Stream<V> {
        match &self.source {
            Source::Constant(value) => Stream::just(value.clone()),
            Source::Captured(inner) => {
                let inner = inner.clone();
                Stream::new(move |observer| {
                    let retained = inner.clone();
                    inner
                        .stream()
                        .subscribe_observer(observer)
                        .and(Disposable::new(move || drop(retained)))
                })
            }
            Source::Composed(composed) => composed.stream(),
        }
    }

    fn mode(&self) -> &'static str {
        match self.source {
            Source::Constant(_) => "constant",
            Source::Captured(_) => "captured",
            Source::Composed(_) => "composed",
        }
    }
}

impl<V: Clone + Send + Sync + 'static> ObservableProperty<V> for Property<V> {
    fn value(&self) -> V {
        Property::value(self)
    }

    fn stream(&self) -> Stream<V> {
        Property::stream(self)
    }
}

impl<V: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for Property<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("mode", &self.mode())
            .field("value", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PropertyError;
    use crate::property::MutableProperty;
    use crate::stream::Subject;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    fn record<V: Clone + Send + Sync + 'static>(
        prop: &Property<V>,
    ) -> (Arc<Mutex<Vec<V>>>, Disposable) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = log.clone();
        let sub = prop.stream().subscribe(move |v: &V| log_c.lock().push(v.clone()));
        (log, sub)
    }

    // ------------------------------------------------------------------
    // Constant
    // ------------------------------------------------------------------

    #[test]
    fn constant_value_and_stream() {
        let prop = Property::constant(5);
        assert_eq!(prop.value(), 5);
        let (log, _sub) = record(&prop);
        assert_eq!(*log.lock(), vec![5]);
    }

    // ------------------------------------------------------------------
    // Capture
    // ------------------------------------------------------------------

    #[test]
    fn capture_forwards_value_and_stream() {
        let source = MutableProperty::new(1);
        let prop = Property::capture(source.clone());
        let (log, _sub) = record(&prop);
        source.set(2);
        assert_eq!(prop.value(), 2);
        assert_eq!(*log.lock(), vec![1, 2]);
    }

    #[test]
    fn capture_keeps_source_alive() {
        let prop = {
            let source = MutableProperty::new(0);
            let prop = Property::capture(source.clone());
            source.set(3);
            prop
        };
        assert_eq!(prop.value(), 3);
        let (log, _sub) = record(&prop);
        assert_eq!(*log.lock(), vec![3]);
    }

    #[test]
    fn dropping_capture_leaves_other_holders_subscribed() {
        let source = MutableProperty::new(0);
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_c = log.clone();
        let _direct = source.stream().subscribe(move |v: &i32| log_c.lock().push(*v));

        let prop = Property::capture(source.clone());
        let (_captured_log, captured_sub) = record(&prop);
        drop(captured_sub);
        drop(prop);

        source.set(1);
        assert_eq!(*log.lock(), vec![0, 1]);
        assert_eq!(source.observer_count(), 1);
    }

    // ------------------------------------------------------------------
    // Compose
    // ------------------------------------------------------------------

    #[test]
    fn compose_tracks_source() {
        let source = MutableProperty::new("a");
        let prop = Property::compose(&source).unwrap();
        source.set("b");
        assert_eq!(prop.value(), "b");
    }

    #[test]
    fn compose_does_not_retain_source() {
        let source = MutableProperty::new(1);
        let prop = Property::compose(&source).unwrap();
        drop(source);
        assert_eq!(prop.value(), 1);
        let (log, _sub) = record(&prop);
        assert_eq!(*log.lock(), vec![1]);
    }

    #[test]
    fn from_dormant_stream_fails() {
        let result = Property::<i32>::from_stream(Stream::never());
        assert_eq!(
            result.err(),
            Some(PropertyError::NoInitialValue { label: None })
        );
    }

    #[test]
    fn from_stream_with_label_reports_it() {
        let config = ComposeConfig::new().with_label("clock");
        let err = Property::<u64>::from_stream_with(Stream::never(), config)
            .err()
            .map(|e| e.to_string());
        assert_eq!(
            err.as_deref(),
            Some("upstream of `clock` went dormant without delivering an initial value")
        );
    }

    #[test]
    fn with_initial_then_values() {
        let pipe = Subject::new();
        let prop = Property::with_initial(0, pipe.stream());
        let (log, _sub) = record(&prop);
        pipe.send(1);
        pipe.send(2);
        assert_eq!(prop.value(), 2);
        assert_eq!(*log.lock(), vec![0, 1, 2]);
    }

    // ------------------------------------------------------------------
    // Map
    // ------------------------------------------------------------------

    #[test]
    fn map_constant_stays_constant() {
        let prop = Property::constant(2).map(|v| v * 10);
        assert_eq!(prop.value(), 20);
        assert_eq!(prop.mode(), "constant");
    }

    #[test]
    fn map_follows_source() {
        let source = MutableProperty::new(2);
        let doubled = source.read_only().map(|v| v * 2);
        assert_eq!(doubled.value(), 4);
        source.set(5);
        assert_eq!(doubled.value(), 10);
        assert_eq!(doubled.mode(), "composed");
    }

    /// Breaks the replay contract: its stream only carries later changes.
    struct ForgetfulProperty(Subject<i32>);

    impl ObservableProperty<i32> for ForgetfulProperty {
        fn value(&self) -> i32 {
            0
        }

        fn stream(&self) -> Stream<i32> {
            self.0.stream()
        }
    }

    #[test]
    #[should_panic(expected = "property streams deliver their current value on subscribe")]
    fn map_over_non_replaying_capture_panics() {
        let prop = Property::capture(ForgetfulProperty(Subject::new()));
        let _ = prop.map(|v| v + 1);
    }

    #[test]
    fn from_stream_over_non_replaying_capture_fails() {
        let prop = Property::capture(ForgetfulProperty(Subject::new()));
        let result = Property::from_stream(prop.stream().map(|v| v + 1));
        assert!(matches!(
            result,
            Err(PropertyError::NoInitialValue { label: None })
        ));
    }

    // ------------------------------------------------------------------
    // Misc
    // ------------------------------------------------------------------

    #[test]
    fn clone_shares_source() {
        let source = MutableProperty::new(1);
        let prop = Property::compose(&source).unwrap();
        let cloned = prop.clone();
        source.set(4);
        assert_eq!(cloned.value(), 4);
        assert_eq!(prop.value(), 4);
    }

    #[test]
    fn debug_shows_mode_and_value() {
        let prop = Property::constant(1);
        assert_eq!(
            format!("{prop:?}"),
            r#"Property { mode: "constant", value: 1 }"#
        );
        let captured = MutableProperty::new(2).read_only();
        assert!(format!("{captured:?}").contains(r#"mode: "captured""#));
    }
}
