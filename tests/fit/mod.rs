//! Fit entity and history tests.
