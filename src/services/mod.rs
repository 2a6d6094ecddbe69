/*
 * Responsibility
 * - Services that talk to the outside world (token verification, Supabase backend)
 */
pub mod auth;
pub mod files;
