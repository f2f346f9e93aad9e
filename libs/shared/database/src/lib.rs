pub mod supabase;

pub use supabase::{eq, in_list, is_conflict, SupabaseClient, StoreConflict};
