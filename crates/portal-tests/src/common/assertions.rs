// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Assertions with failure messages that name the path and user involved.

use portal_core::{AuthContext, GuardDecision, GuardState, LoadState, Navigation, RouteResolution};

// =============================================================================
// AuthContext Assertions
// =============================================================================

/// Assertion extensions for [`AuthContext`].
pub trait ContextAssertions {
    /// Assert that no one is signed in and loading is over.
    fn assert_anonymous(&self);

    /// Assert that `username` is signed in.
    fn assert_signed_in_as(&self, username: &str);

    /// Assert the load state.
    fn assert_state(&self, expected: LoadState);
}

impl ContextAssertions for AuthContext {
    fn assert_anonymous(&self) {
        assert!(
            !self.is_loading() && !self.is_authenticated(),
            "Expected anonymous context, got {} as {:?}",
            self.state(),
            self.username()
        );
    }

    fn assert_signed_in_as(&self, username: &str) {
        assert!(
            self.is_authenticated(),
            "Expected {username} to be signed in, state is {}",
            self.state()
        );
        assert_eq!(self.username(), Some(username));
    }

    fn assert_state(&self, expected: LoadState) {
        assert_eq!(
            self.state(),
            expected,
            "Unexpected load state for {:?}",
            self.username()
        );
    }
}

// =============================================================================
// Navigation Assertions
// =============================================================================

/// Assertion extensions for [`RouteResolution`].
pub trait NavigationAssertions {
    /// Assert that the page renders.
    fn assert_render(&self);

    /// Assert that the shell waits for the session.
    fn assert_wait(&self);

    /// Assert a redirect to `path` and return the full location.
    fn assert_redirect_to(&self, path: &str) -> String;
}

impl NavigationAssertions for RouteResolution {
    fn assert_render(&self) {
        assert_eq!(
            self.navigation,
            Navigation::Render,
            "Expected {} to render (pattern {:?})",
            self.path,
            self.pattern
        );
    }

    fn assert_wait(&self) {
        assert_eq!(self.navigation, Navigation::Wait, "Expected {} to wait", self.path);
    }

    fn assert_redirect_to(&self, path: &str) -> String {
        match &self.navigation {
            Navigation::Redirect(redirect) => {
                assert_eq!(
                    redirect.path, path,
                    "Unexpected redirect target for {}",
                    self.path
                );
                redirect.location()
            }
            other => panic!(
                "Expected {} to redirect to {path}, got {other:?}",
                self.path
            ),
        }
    }
}

/// Assertion extensions for [`GuardDecision`].
pub trait DecisionAssertions {
    /// Assert access was granted.
    fn assert_allowed(&self);

    /// Assert a denial with the given state and redirect target.
    fn assert_denied(&self, state: GuardState, redirect_path: &str);
}

impl DecisionAssertions for GuardDecision {
    fn assert_allowed(&self) {
        assert!(self.is_allowed(), "Expected access, got {:?}", self);
    }

    fn assert_denied(&self, state: GuardState, redirect_path: &str) {
        assert_eq!(self.state, state);
        let redirect = self.redirect.as_ref().expect("Denial without redirect");
        assert_eq!(redirect.path, redirect_path);
    }
}
