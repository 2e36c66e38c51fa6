//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command can regenerate them from a live database.

diesel::table! {
    /// Registered residents of the community.
    ///
    /// `car_plate` and `permit_number` each carry a `UNIQUE` constraint
    /// (`residents_car_plate_key`, `residents_permit_number_key`).
    residents (id) {
        id -> Uuid,
        full_name -> Text,
        section -> Text,
        building -> Text,
        door -> Text,
        car_plate -> Text,
        permit_number -> Text,
        phone_primary -> Text,
        phone_secondary -> Nullable<Text>,
        created_at -> Timestamptz,
        /// Set by the application on every write; indexed for listing.
        updated_at -> Timestamptz,
    }
}
