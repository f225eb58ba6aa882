// Mirrors migrations/2024-11-20-000000_create_songs/up.sql.

diesel::table! {
    songs (id) {
        id -> BigInt,
        #[sql_name = "group"]
        group_name -> Text,
        song -> Text,
        #[sql_name = "releasedate"]
        release_date -> Text,
        link -> Text,
        text -> Text,
    }
}
