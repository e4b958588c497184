// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Skills for the Auto-Venda sales agent.
//!
//! A skill is a declarative trigger set and prompt fragment loaded from
//! `skill.toml`, optionally bound to one of the built-in extraction hooks.
//! The matcher picks at most one skill per turn; the orchestrator runs its
//! hook and merges the outcome into the reply.

pub mod hooks;
pub mod manifest;
pub mod matcher;
pub mod registry;

pub use hooks::{
    FailureKind, Hook, HookContext, HookData, HookFailure, HookInput, HookOutcome,
};
pub use manifest::{load_manifest, parse_manifest, SkillDefinition};
pub use matcher::match_skill;
pub use registry::SkillRegistry;
