table! {
    games (game_id) {
        game_id -> Integer,
        game_name -> Text,
        publisher_id -> Integer,
    }
}

table! {
    publishers (publisher_id) {
        publisher_id -> Integer,
        publisher_name -> Text,
        country -> Nullable<Text>,
        founded_year -> Nullable<Integer>,
    }
}

table! {
    platforms (platform_id) {
        platform_id -> Integer,
        platform_code -> Text,
        platform_name -> Text,
        manufacturer -> Nullable<Text>,
        release_year -> Nullable<Integer>,
    }
}

table! {
    genres (genre_id) {
        genre_id -> Integer,
        genre_name -> Text,
        description -> Nullable<Text>,
    }
}

table! {
    game_genres (game_id, genre_id) {
        game_id -> Integer,
        genre_id -> Integer,
    }
}

table! {
    game_releases (game_release_id) {
        game_release_id -> Integer,
        game_id -> Integer,
        platform_id -> Integer,
        release_year -> Nullable<Integer>,
    }
}

table! {
    regions (region_id) {
        region_id -> Integer,
        region_name -> Text,
    }
}

table! {
    regional_sales (sale_id) {
        sale_id -> Integer,
        game_release_id -> Integer,
        region_id -> Integer,
        sales_in_millions -> Numeric,
    }
}

joinable!(games -> publishers (publisher_id));
joinable!(game_genres -> games (game_id));
joinable!(game_genres -> genres (genre_id));
joinable!(game_releases -> games (game_id));
joinable!(game_releases -> platforms (platform_id));
joinable!(regional_sales -> game_releases (game_release_id));
joinable!(regional_sales -> regions (region_id));
allow_tables_to_appear_in_same_query!(
    games,
    publishers,
    platforms,
    genres,
    game_genres,
    game_releases,
    regions,
    regional_sales,
);
