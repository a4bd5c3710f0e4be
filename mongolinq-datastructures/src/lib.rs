pub mod unique_id_map;
