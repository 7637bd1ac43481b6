mod cleaner_test;
mod embed_test;
mod find_test;
mod id_allocator_test;
mod mutation_test;
mod query_test;
