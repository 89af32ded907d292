//! # Cart Sessions
//!
//! Shopping carts of the active shopping sessions, kept in memory.
//!
//! ## Thread Safety
//! The session map sits behind `Arc<Mutex<_>>`: clones of `CartSessions`
//! share the same carts, and a cart is only ever changed by one task at a
//! time.
//!
//! ## Session Lifecycle
//! ```text
//! open / with_cart ──► session exists? ── yes ──► touch (most recently used)
//!                              │
//!                              no ──► at capacity? ── yes ──► evict least
//!                                          │                 recently used
//!                                          ▼
//!                                   new empty cart
//!
//! close(id) ──► cart handed back, session gone
//! clear()   ──► every session gone (shutdown)
//! ```
//! Carts hold item ids and quantities only; price them with
//! [`crate::service::catalog::CatalogService::price_cart`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use petstore_core::ShoppingCart;

/// Sessions kept before the least recently used one is evicted.
pub const DEFAULT_CART_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Sessions {
    carts: HashMap<String, Session>,
    clock: u64,
}

#[derive(Debug)]
struct Session {
    cart: ShoppingCart,
    last_used: u64,
}

impl Sessions {
    /// Returns the cart for `id`, creating it (and evicting if full) when absent.
    fn touch(&mut self, id: &str, capacity: usize) -> &mut ShoppingCart {
        self.clock += 1;
        let now = self.clock;

        if !self.carts.contains_key(id) && self.carts.len() >= capacity {
            self.evict_oldest();
        }

        let session = self.carts.entry(id.to_string()).or_insert_with(|| {
            debug!(session = %id, "Cart session opened");
            Session {
                cart: ShoppingCart::new(),
                last_used: now,
            }
        });
        session.last_used = now;
        &mut session.cart
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .carts
            .iter()
            .min_by_key(|(_, session)| session.last_used)
            .map(|(id, _)| id.clone());

        if let Some(id) = oldest {
            self.carts.remove(&id);
            debug!(session = %id, "Evicted least recently used cart");
        }
    }
}

/// Bounded map of session id → shopping cart.
///
/// Constructed by the caller and passed to whatever serves the sessions;
/// there is no global instance.
#[derive(Debug, Clone)]
pub struct CartSessions {
    sessions: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl CartSessions {
    /// Creates an empty session map holding at most `capacity` carts.
    pub fn new(capacity: usize) -> Self {
        CartSessions {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Makes sure session `id` has a cart. Returns true if it was created.
    pub async fn open(&self, id: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        let existed = sessions.carts.contains_key(id);
        sessions.touch(id, self.capacity);
        !existed
    }

    /// Runs `f` on the cart of session `id`, opening the session if needed.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// sessions.with_cart("abc", |cart| cart.add_item("EST-1")).await?;
    /// ```
    pub async fn with_cart<F, R>(&self, id: &str, f: F) -> R
    where
        F: FnOnce(&mut ShoppingCart) -> R,
    {
        let mut sessions = self.sessions.lock().await;
        f(sessions.touch(id, self.capacity))
    }

    /// A copy of the cart of session `id`, if the session is open.
    pub async fn snapshot(&self, id: &str) -> Option<ShoppingCart> {
        let sessions = self.sessions.lock().await;
        sessions.carts.get(id).map(|session| session.cart.clone())
    }

    /// Ends session `id` and hands back its cart.
    pub async fn close(&self, id: &str) -> Option<ShoppingCart> {
        let mut sessions = self.sessions.lock().await;
        let closed = sessions.carts.remove(id).map(|session| session.cart);
        if closed.is_some() {
            debug!(session = %id, "Cart session closed");
        }
        closed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.carts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every session.
    pub async fn clear(&self) {
        let mut sessions = self.sessions.lock().await;
        let count = sessions.carts.len();
        sessions.carts.clear();
        debug!(count, "All cart sessions closed");
    }
}

impl Default for CartSessions {
    fn default() -> Self {
        Self::new(DEFAULT_CART_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petstore_core::CoreError;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let sessions = CartSessions::default();

        sessions.with_cart("a", |cart| cart.add_item("EST1")).await.unwrap();
        sessions.with_cart("a", |cart| cart.add_item("EST1")).await.unwrap();
        sessions.with_cart("b", |cart| cart.add_item("EST2")).await.unwrap();

        let a = sessions.snapshot("a").await.unwrap();
        assert_eq!(a.quantity_of("EST1"), 2);
        assert_eq!(a.quantity_of("EST2"), 0);
        assert_eq!(sessions.len().await, 2);
    }

    #[tokio::test]
    async fn test_open_and_close() {
        let sessions = CartSessions::new(4);

        assert!(sessions.open("a").await);
        assert!(!sessions.open("a").await);
        assert!(sessions.snapshot("a").await.unwrap().is_empty());

        sessions.with_cart("a", |cart| cart.add_item("EST1")).await.unwrap();
        let closed = sessions.close("a").await.unwrap();
        assert_eq!(closed.len(), 1);

        assert!(sessions.close("a").await.is_none());
        assert!(sessions.snapshot("a").await.is_none());
        assert!(sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let sessions = CartSessions::new(2);

        sessions.open("a").await;
        sessions.open("b").await;
        // "a" becomes the most recently used
        sessions.with_cart("a", |cart| cart.add_item("EST1")).await.unwrap();
        sessions.open("c").await;

        assert_eq!(sessions.len().await, 2);
        assert!(sessions.snapshot("b").await.is_none());
        assert_eq!(sessions.snapshot("a").await.unwrap().len(), 1);
        assert!(sessions.snapshot("c").await.is_some());
    }

    #[tokio::test]
    async fn test_cart_errors_pass_through() {
        let sessions = CartSessions::new(1);

        sessions
            .with_cart("a", |cart| cart.update_item_quantity("EST1", 3))
            .await
            .unwrap();
        assert_eq!(sessions.snapshot("a").await.unwrap().quantity_of("EST1"), 3);

        let result = sessions
            .with_cart("a", |cart| cart.update_item_quantity("EST1", 1000))
            .await;
        assert!(matches!(result, Err(CoreError::QuantityTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_clones_share_sessions_and_clear() {
        let sessions = CartSessions::new(8);
        let other = sessions.clone();

        other.with_cart("a", |cart| cart.add_item("EST1")).await.unwrap();
        assert_eq!(sessions.snapshot("a").await.unwrap().len(), 1);

        sessions.clear().await;
        assert!(other.is_empty().await);
        assert_eq!(other.capacity(), 8);
    }
}
