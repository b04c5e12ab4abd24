
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use itertools::Itertools;
use lancedb::{
    Connection, DistanceType,
    query::{ExecutableQuery, QueryBase},
};
use tracing::{debug, info, warn};

use super::{ChunkMetadata, DocumentFilter, EmbeddingRecord};
use crate::DocChatError;

const TABLE_NAME: &str = "chunks";

/// Vector database store using LanceDB for similarity search
pub struct VectorStore {
    connection: Connection,
    table_name: String,
    vector_dimension: usize,
}

/// Search result from vector similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk_metadata: ChunkMetadata,
    /// Cosine similarity, higher is better
    pub similarity_score: f32,
    pub distance: f32,
}

impl VectorStore {
    /// Create or open the vector store, creating the table when missing.
    /// This is the ingestion-side constructor.
    #[inline]
    pub async fn create(db_path: &Path, vector_dimension: usize) -> Result<Self, DocChatError> {
        let mut store = Self::connect(db_path, vector_dimension).await?;

        let table_names = store.table_names().await?;
        if let Some(existing) = store.detect_existing_dimension(&table_names).await? {
            store.vector_dimension = existing;
        } else {
            info!(
                "Creating chunks table with {} dimensions",
                store.vector_dimension
            );
            let schema = store.create_schema(store.vector_dimension);
            store
                .connection
                .create_empty_table(&store.table_name, schema)
                .execute()
                .await
                .map_err(|e| DocChatError::Index(format!("Failed to create table: {}", e)))?;
        }

        info!("Vector store initialized at {}", db_path.display());
        Ok(store)
    }

    /// Open an existing vector store for querying. Fails with an index
    /// error when the store has never been built, so callers can tell
    /// "no matches" apart from "no index".
    #[inline]
    pub async fn open_existing(db_path: &Path, vector_dimension: usize) -> Result<Self, DocChatError> {
        if !db_path.exists() {
            return Err(DocChatError::Index(format!(
                "No vector index found at {}; run `docchat ingest` first",
                db_path.display()
            )));
        }

        let mut store = Self::connect(db_path, vector_dimension).await?;

        let table_names = store.table_names().await?;
        match store.detect_existing_dimension(&table_names).await? {
            Some(dimension) => {
                store.vector_dimension = dimension;
                Ok(store)
            }
            None => Err(DocChatError::Index(format!(
                "Vector index at {} contains no chunks table; run `docchat ingest` first",
                db_path.display()
            ))),
        }
    }

    async fn connect(db_path: &Path, vector_dimension: usize) -> Result<Self, DocChatError> {
        debug!("Connecting to LanceDB at {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DocChatError::Index(format!("Failed to create vector database directory: {}", e))
            })?;
        }

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            vector_dimension,
        })
    }

    async fn table_names(&self) -> Result<Vec<String>, DocChatError> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to list tables: {}", e)))
    }

    /// Detect the vector dimension of the existing chunks table, if any
    async fn detect_existing_dimension(
        &self,
        table_names: &[String],
    ) -> Result<Option<usize>, DocChatError> {
        if !table_names.contains(&self.table_name) {
            return Ok(None);
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to open existing table: {}", e)))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to get table schema: {}", e)))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(Some(*size as usize));
                }
            }
        }

        Err(DocChatError::Index(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    /// Create schema with the specified vector dimension
    fn create_schema(&self, vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("doc_name", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("page", DataType::UInt32, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Store a batch of embedding records.
    ///
    /// When the embedding dimension of the batch differs from the table's,
    /// the table is dropped and recreated; stale vectors from a different
    /// model would poison every search.
    #[inline]
    pub async fn upsert_batch(&mut self, records: Vec<EmbeddingRecord>) -> Result<(), DocChatError> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        debug!("Storing batch of {} embeddings", records.len());

        let vector_dim = records[0].vector.len();
        if self.vector_dimension != vector_dim {
            warn!(
                "Vector dimension changed from {} to {}, recreating table",
                self.vector_dimension, vector_dim
            );
            self.rebuild_with_dimension(vector_dim).await?;
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to open table: {}", e)))?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to insert embeddings: {}", e)))?;

        info!("Stored {} embeddings", records.len());
        Ok(())
    }

    /// Discard all stored records, leaving an empty table. Ingestion runs
    /// are full rebuilds: delete everything, then bulk-insert.
    #[inline]
    pub async fn rebuild(&mut self) -> Result<(), DocChatError> {
        let dimension = self.vector_dimension;
        self.rebuild_with_dimension(dimension).await
    }

    async fn rebuild_with_dimension(&mut self, vector_dim: usize) -> Result<(), DocChatError> {
        info!("Rebuilding chunks table with {} dimensions", vector_dim);

        self.drop_table_if_exists().await?;

        let schema = self.create_schema(vector_dim);
        self.connection
            .create_empty_table(&self.table_name, schema)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to recreate table: {}", e)))?;

        self.vector_dimension = vector_dim;
        Ok(())
    }

    async fn drop_table_if_exists(&self) -> Result<(), DocChatError> {
        let table_names = self.table_names().await?;

        if table_names.contains(&self.table_name) {
            debug!("Dropping existing chunks table");
            self.connection
                .drop_table(&self.table_name)
                .await
                .map_err(|e| DocChatError::Index(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }

    /// Create a RecordBatch from embedding records
    fn create_record_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch, DocChatError> {
        let len = records.len();
        let vector_dim = self.vector_dimension;

        let mut ids = Vec::with_capacity(len);
        let mut doc_names = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut pages = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            if record.vector.len() != vector_dim {
                return Err(DocChatError::Index(format!(
                    "Inconsistent vector dimensions within batch: {} vs {}",
                    vector_dim,
                    record.vector.len()
                )));
            }
            ids.push(record.id.as_str());
            doc_names.push(record.metadata.doc_name.as_str());
            sources.push(record.metadata.source.as_str());
            pages.push(record.metadata.page);
            chunk_indices.push(record.metadata.chunk_index);
            contents.push(record.metadata.content.as_str());
            created_ats.push(record.metadata.created_at.as_str());
        }

        let schema = self.create_schema(vector_dim);

        let mut flat_values = Vec::with_capacity(len * vector_dim);
        for record in records {
            flat_values.extend_from_slice(&record.vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| DocChatError::Index(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(doc_names)),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| DocChatError::Index(format!("Failed to create record batch: {}", e)))
    }

    /// Search for the chunks most similar to a query vector.
    ///
    /// Cosine similarity, descending. When a filter is present, only
    /// records whose `doc_name` it allows are eligible and the predicate
    /// is applied before top-k selection. A filter that matches nothing
    /// yields an empty result, not an error.
    #[inline]
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<SearchResult>, DocChatError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        if let Some(filter) = filter {
            if filter.is_empty() {
                debug!("Document filter allows nothing, returning empty result");
                return Ok(Vec::new());
            }
        }

        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to open table: {}", e)))?;

        let mut query = table
            .vector_search(query_vector)
            .map_err(|e| DocChatError::Index(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .distance_type(DistanceType::Cosine)
            .limit(limit);

        if let Some(filter) = filter {
            query = query.only_if(filter.to_predicate());
        }

        let results = query
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to execute search: {}", e)))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to read result stream: {}", e)))?;

        let mut search_results = Vec::new();
        for batch in &batches {
            search_results.extend(self.parse_search_batch(batch)?);
        }

        debug!("Parsed {} search results", search_results.len());
        Ok(search_results)
    }

    /// Parse a single record batch from search results
    fn parse_search_batch(&self, batch: &RecordBatch) -> Result<Vec<SearchResult>, DocChatError> {
        let num_rows = batch.num_rows();

        let doc_names = string_column(batch, "doc_name")?;
        let sources = string_column(batch, "source")?;
        let contents = string_column(batch, "content")?;
        let created_ats = string_column(batch, "created_at")?;
        let pages = u32_column(batch, "page")?;
        let chunk_indices = u32_column(batch, "chunk_index")?;

        let distances = batch
            .column_by_name("_distance")
            .map(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut search_results = Vec::with_capacity(num_rows);
        for row in 0..num_rows {
            let chunk_metadata = ChunkMetadata {
                doc_name: doc_names.value(row).to_string(),
                source: sources.value(row).to_string(),
                page: pages.value(row),
                chunk_index: chunk_indices.value(row),
                content: contents.value(row).to_string(),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances
                .flatten()
                .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

            // Cosine distance is 1 - cosine similarity
            let similarity_score = 1.0 - distance;

            search_results.push(SearchResult {
                chunk_metadata,
                similarity_score,
                distance,
            });
        }

        Ok(search_results)
    }

    /// Distinct document names in the index, sorted
    #[inline]
    pub async fn list_document_names(&self) -> Result<Vec<String>, DocChatError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to open table: {}", e)))?;

        let mut stream = table
            .query()
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to scan table: {}", e)))?;

        let mut names = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to read scan stream: {}", e)))?
        {
            let doc_names = string_column(&batch, "doc_name")?;
            for row in 0..batch.num_rows() {
                names.push(doc_names.value(row).to_string());
            }
        }

        Ok(names.into_iter().sorted().dedup().collect())
    }

    /// Total number of chunks stored
    #[inline]
    pub async fn count_chunks(&self) -> Result<u64, DocChatError> {
        let table = self
            .connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to open table: {}", e)))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| DocChatError::Index(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// The embedding dimension the table is currently built for
    #[inline]
    pub fn vector_dimension(&self) -> usize {
        self.vector_dimension
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, DocChatError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DocChatError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DocChatError::Index(format!("Invalid {} column type", name)))
}

fn u32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt32Array, DocChatError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| DocChatError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| DocChatError::Index(format!("Invalid {} column type", name)))
}
