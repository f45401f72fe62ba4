//! Category resolution via vector similarity.
//!
//! The resolver embeds one search term and looks it up in a named
//! collection, converting cosine distance into similarity and applying the
//! configured threshold. Any provider or store failure degrades to "no
//! matches" so the SQL generator can fall back to LIKE predicates instead
//! of aborting the question.

use std::sync::Arc;
use tracing::warn;

use crate::domain::models::catalog::SimilarityMatch;
use crate::domain::models::config::IndexConfig;
use crate::domain::ports::chat::ToolDescriptor;
use crate::domain::ports::collections::CollectionStore;
use crate::domain::ports::embedding::EmbeddingClient;

/// Similarity search over one collection of categorical values.
pub struct CategoryResolver {
    embeddings: Arc<dyn EmbeddingClient>,
    store: Arc<dyn CollectionStore>,
    threshold: f32,
    top_k: usize,
}

impl CategoryResolver {
    pub fn new(
        embeddings: Arc<dyn EmbeddingClient>,
        store: Arc<dyn CollectionStore>,
        config: &IndexConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            threshold: config.similarity_threshold,
            top_k: config.top_k,
        }
    }

    /// Resolve `term` against `collection`.
    ///
    /// Returns matches with similarity at or above the threshold, ordered
    /// by descending similarity, at most `top_k` of them. A missing or
    /// empty collection, or any provider/store failure, yields an empty
    /// result rather than an error.
    pub async fn resolve(&self, collection: &str, term: &str) -> Vec<SimilarityMatch> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let vectors = match self.embeddings.embed(&[term.to_string()]).await {
            Ok(vectors) => vectors,
            Err(err) => {
                warn!(collection, term, error = %err, "similarity search failed while embedding");
                return Vec::new();
            }
        };
        let Some(vector) = vectors.first() else {
            return Vec::new();
        };

        let hits = match self.store.nearest(collection, vector, self.top_k).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(collection, term, error = %err, "similarity search failed while querying");
                return Vec::new();
            }
        };

        hits.into_iter()
            .filter_map(|hit| {
                let similarity = 1.0 - hit.distance;
                (similarity >= self.threshold).then_some(SimilarityMatch {
                    value: hit.document,
                    similarity,
                })
            })
            .collect()
    }
}

/// The four resolver tools offered to the SQL generator, each bound to one
/// categorical column of the service-call table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverTool {
    OrgUnit,
    ParentOrgUnit,
    TicketType,
    TicketSubtype,
}

impl ResolverTool {
    pub fn all() -> [ResolverTool; 4] {
        [
            ResolverTool::OrgUnit,
            ResolverTool::ParentOrgUnit,
            ResolverTool::TicketType,
            ResolverTool::TicketSubtype,
        ]
    }

    /// Function name announced to the chat provider.
    pub fn wire_name(&self) -> &'static str {
        match self {
            ResolverTool::OrgUnit => "get_nome_unidade_organizacional",
            ResolverTool::ParentOrgUnit => "get_id_unidade_organizacional_mae",
            ResolverTool::TicketType => "get_tipo",
            ResolverTool::TicketSubtype => "get_subtipo",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|tool| tool.wire_name() == name)
    }

    /// Column of the service-call table this tool resolves against.
    pub fn column(&self) -> &'static str {
        match self {
            ResolverTool::OrgUnit => "nome_unidade_organizacional",
            ResolverTool::ParentOrgUnit => "id_unidade_organizacional_mae",
            ResolverTool::TicketType => "tipo",
            ResolverTool::TicketSubtype => "subtipo",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            ResolverTool::OrgUnit => {
                "Busca nomes de unidades organizacionais similares ao termo fornecido"
            }
            ResolverTool::ParentOrgUnit => {
                "Busca IDs de unidades organizacionais mãe similares ao termo fornecido"
            }
            ResolverTool::TicketType => "Busca tipos de chamados similares ao termo fornecido",
            ResolverTool::TicketSubtype => {
                "Busca subtipos de chamados similares ao termo fornecido"
            }
        }
    }

    fn query_description(&self) -> &'static str {
        match self {
            ResolverTool::OrgUnit => "Termo para buscar unidades organizacionais similares",
            ResolverTool::ParentOrgUnit => "Termo para buscar unidades mãe similares",
            ResolverTool::TicketType => "Termo para buscar tipos similares",
            ResolverTool::TicketSubtype => "Termo para buscar subtipos similares",
        }
    }

    /// Tool descriptor for the chat-completion request.
    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.wire_name().to_string(),
            description: self.description().to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": self.query_description(),
                    }
                },
                "required": ["query"],
            }),
        }
    }

    /// Collection this tool queries, from config or the conventional
    /// `{column}_collection` name.
    pub fn collection_name(&self, index: &IndexConfig) -> String {
        index
            .collection_for(self.column())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}_collection", self.column()))
    }

    /// Format resolution results the way the SQL generator expects them.
    pub fn render_matches(&self, term: &str, matches: &[SimilarityMatch]) -> String {
        if matches.is_empty() {
            return format!(
                "Busca por similaridade não disponível para '{term}'. Use padrões LIKE na consulta SQL."
            );
        }
        let rendered: Vec<String> = matches.iter().map(SimilarityMatch::render).collect();
        format!(
            "{} similares a '{term}': {}",
            self.result_prefix(),
            rendered.join(", ")
        )
    }

    fn result_prefix(&self) -> &'static str {
        match self {
            ResolverTool::OrgUnit => "Unidades organizacionais",
            ResolverTool::ParentOrgUnit => "Unidades mãe",
            ResolverTool::TicketType => "Tipos",
            ResolverTool::TicketSubtype => "Subtipos",
        }
    }
}
