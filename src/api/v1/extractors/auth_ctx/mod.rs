/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Give handlers the verified caller (AuthCtx)
 * - axum glue lives in core, the type itself in types
 */

mod core;
mod types;

pub use self::core::AuthCtxExtractor;
pub use types::AuthCtx;
