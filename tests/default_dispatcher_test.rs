use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use herald::notify::{Context, Notifier, NotifyError};

struct Counter {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Notifier for Counter {
    fn name(&self) -> &str {
        "counter"
    }

    async fn send(&self, _ctx: &Context, _subject: &str, _message: &str) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// The default dispatcher is process-wide, so its whole lifecycle lives in one test.
#[tokio::test]
async fn default_dispatcher_is_shared_and_mutable() {
    let dispatcher = herald::default_dispatcher();
    assert!(std::ptr::eq(dispatcher, herald::default_dispatcher()));
    assert!(dispatcher.is_enabled());
    assert!(dispatcher.is_empty());

    herald::send(&Context::background(), "Subject", "Body")
        .await
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    herald::use_services([Arc::new(Counter {
        calls: Arc::clone(&calls),
    }) as Arc<dyn Notifier>]);
    assert_eq!(herald::default_dispatcher().len(), 1);

    herald::send(&Context::background(), "Subject", "Body")
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    herald::default_dispatcher().disable();
    herald::send(&Context::background(), "Subject", "Body")
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    herald::default_dispatcher().enable();
    let independent = herald::Dispatcher::new();
    assert!(independent.is_empty());
}
