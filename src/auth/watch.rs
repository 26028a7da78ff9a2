use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::domain::UserData;

/// Callback invoked with every new auth subject.
pub type Listener = Arc<dyn Fn(&UserData) + Send + Sync>;

struct WatchInner {
    current: UserData,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Holds the current auth subject and fans changes out to listeners.
///
/// Listeners are called after the internal lock is released, so a listener
/// may read the watch or subscribe again without deadlocking.
#[derive(Clone)]
pub struct SubjectWatch {
    inner: Arc<Mutex<WatchInner>>,
}

impl Default for SubjectWatch {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(WatchInner {
                current: UserData::signed_out(),
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl SubjectWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> UserData {
        lock(&self.inner).current.clone()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }

    /// Replaces the subject and notifies every listener.
    pub fn publish(&self, subject: UserData) {
        let listeners: Vec<Listener> = {
            let mut inner = lock(&self.inner);
            inner.current = subject.clone();
            inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        for listener in listeners {
            listener(&subject);
        }
    }

    /// Registers `listener` and immediately replays the current subject to it.
    pub fn subscribe(&self, listener: Listener) -> Subscription {
        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, Arc::clone(&listener)));
            (id, inner.current.clone())
        };
        listener(&current);
        Subscription {
            id,
            watch: Arc::downgrade(&self.inner),
        }
    }
}

/// Keeps a listener registered; dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    watch: Weak<Mutex<WatchInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.watch.upgrade() {
            lock(&inner).listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

// A panicking listener never runs while the lock is held, so the data is intact.
fn lock(inner: &Mutex<WatchInner>) -> MutexGuard<'_, WatchInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn subject(uid: &str) -> UserData {
        UserData {
            user_id: Some(uid.into()),
            ..UserData::default()
        }
    }

    #[test]
    fn subscribe_replays_current_subject() {
        let watch = SubjectWatch::new();
        watch.publish(subject("u1"));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = watch.subscribe(Arc::new(move |user: &UserData| {
            sink.lock().unwrap().push(user.user_id.clone());
        }));
        watch.publish(UserData::signed_out());
        assert_eq!(*seen.lock().unwrap(), vec![Some("u1".to_string()), None]);
    }

    #[test]
    fn dropping_subscription_stops_notifications() {
        let watch = SubjectWatch::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = watch.subscribe(Arc::new(move |_: &UserData| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(watch.listener_count(), 1);
        drop(sub);
        assert_eq!(watch.listener_count(), 0);
        watch.publish(subject("u2"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_may_read_the_watch() {
        let watch = SubjectWatch::new();
        let reader = watch.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let _sub = watch.subscribe(Arc::new(move |_: &UserData| {
            *sink.lock().unwrap() = reader.current().user_id;
        }));
        watch.publish(subject("u3"));
        assert_eq!(seen.lock().unwrap().as_deref(), Some("u3"));
    }
}
