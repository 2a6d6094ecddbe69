/*
 * Responsibility
 * - The "authenticated caller" type handlers see
 * - The middleware verifies the token and stores it in request extensions;
 *   handlers only ever receive this type
 */

/// Context attached to an authenticated request.
///
/// - `user_id` is the token's `sub`, compared verbatim against `owner_id`
/// - `role` is the Supabase role claim (logging only)
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user_id: String,
    pub role: Option<String>,
}
