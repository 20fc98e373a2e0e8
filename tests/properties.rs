//! Property tests for dispatch ordering and unsubscribe.

use parking_lot::Mutex;
use proptest::prelude::*;
use record_notify::{Channel, EventRegistry, FnObserver, Observer, SubjectId};
use std::sync::Arc;

type Log = Arc<Mutex<Vec<usize>>>;

fn observers(log: &Log, count: usize) -> Vec<Arc<impl Observer<()>>> {
    (0..count)
        .map(|i| {
            let log = Arc::clone(log);
            Arc::new(FnObserver::new(move |_, _, _: &()| {
                log.lock().push(i);
                Ok(())
            }))
        })
        .collect()
}

fn channel(choice: u8) -> Channel {
    match choice {
        0 => Channel::All,
        1 => Channel::named("a"),
        _ => Channel::named("b"),
    }
}

fn arb_subscriptions() -> impl Strategy<Value = Vec<(usize, u8)>> {
    proptest::collection::vec((0..4usize, 0..3u8), 0..24)
}

proptest! {
    #[test]
    fn dispatch_is_named_then_wildcard(subs in arb_subscriptions()) {
        let log = Log::default();
        let pool = observers(&log, 4);
        let registry = EventRegistry::<()>::new(SubjectId(1));

        for &(who, choice) in &subs {
            registry.subscribe(channel(choice), pool[who].clone()).unwrap();
        }

        let invoked = registry.dispatch("a", &()).unwrap();

        let named = subs.iter().filter(|(_, c)| *c == 1).map(|(w, _)| *w);
        let wildcard = subs.iter().filter(|(_, c)| *c == 0).map(|(w, _)| *w);
        let expected: Vec<usize> = named.chain(wildcard).collect();

        prop_assert_eq!(invoked, expected.len());
        prop_assert_eq!(&*log.lock(), &expected);
    }

    #[test]
    fn unsubscribed_observer_never_seen_via_channel(
        subs in arb_subscriptions(),
        victim in 0..4usize,
    ) {
        let log = Log::default();
        let pool = observers(&log, 4);
        let registry = EventRegistry::<()>::new(SubjectId(1));

        for &(who, choice) in &subs {
            registry.subscribe(channel(choice), pool[who].clone()).unwrap();
        }

        registry.unsubscribe("a", &pool[victim]);
        registry.dispatch("a", &()).unwrap();

        let via_wildcard = subs.iter().filter(|(w, c)| *w == victim && *c == 0).count();
        let seen = log.lock().iter().filter(|&&w| w == victim).count();
        prop_assert_eq!(seen, via_wildcard);
    }
}
