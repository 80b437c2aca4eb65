//! Persistence module split across logical submodules.

mod connection;
mod contacts;
mod ids;


pub use connection::{ensure_schema, open_store, open_store_at};
pub use contacts::{
    clear_contacts, delete_contact, fetch_contacts, fetch_relations, insert_contact,
    update_contact,
};
pub use ids::{allocate_contact_id, IdError, ID_SPACE};
