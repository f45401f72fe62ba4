//! Prompt templates for the question pipeline.
//!
//! The operational language of the 1746 dataset is Portuguese, so the
//! prompts are too. Placeholders use `{name}` and are substituted with
//! plain string replacement.

use crate::domain::models::session::{ChatMessage, Row};

const ROUTER_PROMPT: &str = r#"
Analise a seguinte pergunta e determine se ela requer consulta a dados ou é conversacional.

Pergunta: "{question}"

Responda APENAS com uma das opções:
- "data_query" se a pergunta for sobre dados/estatísticas (ex: quantos, qual, quais, como, quando sobre chamados, bairros, etc.)
- "conversational" se for saudação, agradecimento, pergunta genérica ou não relacionada a dados específicos

Exemplos:
- "Quantos chamados foram abertos?" -> data_query
- "Qual o bairro com mais chamados?" -> data_query
- "Olá, tudo bem?" -> conversational
- "Obrigado!" -> conversational
- "Me dê sugestões de brincadeiras" -> conversational
"#;

const SQL_GENERATOR_SYSTEM_PROMPT: &str = r#"Você é um especialista em SQL para BigQuery.

INSTRUÇÕES PARA USO DAS TOOLS:
- Se a pergunta mencionar termos que podem corresponder a colunas categóricas, use as tools para encontrar valores exatos
- Tools disponíveis:
* get_nome_unidade_organizacional: Para buscar unidades organizacionais
* get_id_unidade_organizacional_mae: Para buscar unidades mãe
* get_tipo: Para buscar tipos de chamados
* get_subtipo: Para buscar subtipos específicos
- Use as tools ANTES de gerar o SQL para garantir valores corretos

Primeiro, faça um REASONING sobre a descrição do schema e como ela consegue atender à pergunta.

Depois gere uma consulta SQL otimizada.

INFORMAÇÕES IMPORTANTES:
- Tabela principal: `datario.adm_central_atendimento_1746.chamado`
- Tabela de bairros: `datario.dados_mestres.bairro`
- Atente-se ao uso da coluna correta de data em suas consultas
- Evite SELECT * - selecione apenas colunas necessárias
- Use LIMIT quando apropriado para evitar resultados excessivos

DESCRIÇÃO DA TABELA DE CHAMADOS:
{schema_chamado}

DESCRIÇÃO DA TABELA DADOS DOS BAIRROS:
{schema_bairro}

PARA JOINS COM BAIRROS:
- Use: JOIN `datario.dados_mestres.bairro`

INSTRUÇÕES:
1. Use agregações (COUNT, GROUP BY) quando apropriado
2. Para top N, use ORDER BY e LIMIT
3. Se mencionar nomes de bairros, faça JOIN com a tabela de bairros
4. O SQL gerado será executado imediatamente, não adicione explicações ou comentários

{agent_scratchpad}

Formato:
REASONING: [seu raciocínio]
SQL: [apenas o código SQL]"#;

const TOOL_CONTEXT_PROMPT: &str = r#"Você é um especialista em SQL para BigQuery.

INSTRUÇÕES:
- Use os resultados das tools abaixo para gerar a consulta SQL
- Se as tools não encontraram resultados similares, use LIKE com wildcards para buscar termos relacionados
- NUNCA retorne [] ou SQL inválida - sempre gere uma consulta válida
- Se não encontrou valores exatos, use termos mais genéricos ou padrões LIKE

RESULTADOS DAS TOOLS:
{tool_context}

DESCRIÇÃO DA TABELA DE CHAMADOS:
{schema_chamado}

DESCRIÇÃO DA TABELA DADOS DOS BAIRROS:
{schema_bairro}

INSTRUÇÕES PARA FALLBACK:
- Se não encontrou "Iluminação Pública", use LIKE '%iluminação%' ou '%lâmpada%' ou '%poste%'
- Se não encontrou "reparo de buraco", use LIKE '%buraco%' ou '%pavimentação%' ou '%via%'
- Se não encontrou "fiscalização estacionamento", use LIKE '%fiscalização%' e '%estacionamento%'
- Sempre prefira gerar SQL funcional mesmo que aproximada
- SEMPRE use nomes completos de tabelas: `datario.adm_central_atendimento_1746.chamado` e `datario.dados_mestres.bairro`
- NUNCA use apenas "chamado" ou "bairro" - sempre com o dataset completo

Primeiro, faça um REASONING sobre como usar os resultados das tools ou fallback.
Depois gere uma consulta SQL otimizada e VÁLIDA.

Formato:
REASONING: [seu raciocínio]
SQL: [apenas o código SQL válido]"#;

const RESPONSE_SYNTHESIZER_PROMPT: &str = r#"
Você é um assistente especializado em análise de dados da Prefeitura do Rio de Janeiro.

Com base nos dados retornados da consulta SQL, forneça uma resposta clara e informativa em português.

DADOS DA CONSULTA:
{data_result}

PERGUNTA ORIGINAL:
{question}

INSTRUÇÕES:
- Seja claro e direto
- Use números formatados adequadamente
- Se não há dados, explique de forma educada
- Mantenha tom profissional mas acessível
- Foque na informação mais relevante

Resposta:
"#;

const ERROR_RESPONSE_PROMPT: &str = r#"
Houve um erro ao processar a consulta de dados para a pergunta: "{question}"

Erro: {error}

Forneça uma resposta amigável explicando que não foi possível obter os dados solicitados
e sugira que o usuário reformule a pergunta ou tente novamente.
"#;

const CONVERSATIONAL_PROMPT: &str = r#"
Você é um assistente de análise de dados da Prefeitura do Rio de Janeiro.

Pergunta: {question}

Responda de forma amigável e profissional. Se a pergunta não for relacionada a dados da prefeitura, seja educado mas redirecione para seu propósito principal.
"#;

pub fn router_prompt(question: &str) -> String {
    ROUTER_PROMPT.replace("{question}", question)
}

pub fn sql_generator_system_prompt(
    schema_chamado: &str,
    schema_bairro: &str,
    agent_scratchpad: &str,
) -> String {
    SQL_GENERATOR_SYSTEM_PROMPT
        .replace("{schema_chamado}", schema_chamado)
        .replace("{schema_bairro}", schema_bairro)
        .replace("{agent_scratchpad}", agent_scratchpad)
}

pub fn tool_context_prompt(
    tool_context: &str,
    schema_chamado: &str,
    schema_bairro: &str,
) -> String {
    TOOL_CONTEXT_PROMPT
        .replace("{tool_context}", tool_context)
        .replace("{schema_chamado}", schema_chamado)
        .replace("{schema_bairro}", schema_bairro)
}

pub fn response_synthesizer_prompt(data_result: &str, question: &str) -> String {
    RESPONSE_SYNTHESIZER_PROMPT
        .replace("{data_result}", data_result)
        .replace("{question}", question)
}

pub fn error_response_prompt(question: &str, error: &str) -> String {
    ERROR_RESPONSE_PROMPT
        .replace("{question}", question)
        .replace("{error}", error)
}

pub fn conversational_prompt(question: &str) -> String {
    CONVERSATIONAL_PROMPT.replace("{question}", question)
}

/// Prior messages rendered as `role: content` lines for the generator's
/// system prompt.
pub fn agent_scratchpad(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role.as_str(), message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result rows condensed for the synthesizer: at most the first 10 rows,
/// with a count of any remainder.
pub fn data_summary(rows: &[Row]) -> String {
    if rows.is_empty() {
        return "Nenhum resultado encontrado.".to_string();
    }

    let visible = rows.len().min(10);
    let rendered =
        serde_json::to_string(&rows[..visible]).unwrap_or_else(|_| "[]".to_string());

    let mut summary = format!("Dados encontrados ({} linhas):\n{rendered}", rows.len());
    if rows.len() > 10 {
        summary.push_str(&format!("\n... e mais {} linhas", rows.len() - 10));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, value: i64) -> Row {
        let mut row = Row::new();
        row.insert(key.to_string(), serde_json::json!(value));
        row
    }

    #[test]
    fn router_prompt_embeds_question() {
        let prompt = router_prompt("Quantos chamados foram abertos?");
        assert!(prompt.contains("Pergunta: \"Quantos chamados foram abertos?\""));
        assert!(prompt.contains("data_query"));
    }

    #[test]
    fn generator_prompt_embeds_schemas_and_scratchpad() {
        let prompt = sql_generator_system_prompt("colunas do chamado", "colunas do bairro", "user: oi");
        assert!(prompt.contains("colunas do chamado"));
        assert!(prompt.contains("colunas do bairro"));
        assert!(prompt.contains("user: oi"));
        assert!(!prompt.contains("{schema_chamado}"));
    }

    #[test]
    fn scratchpad_renders_roles() {
        let messages = vec![
            ChatMessage::user("Quantos chamados?"),
            ChatMessage::assistant("SQL: SELECT 1"),
        ];
        assert_eq!(
            agent_scratchpad(&messages),
            "user: Quantos chamados?\nassistant: SQL: SELECT 1"
        );
    }

    #[test]
    fn data_summary_counts_rows() {
        assert_eq!(data_summary(&[]), "Nenhum resultado encontrado.");

        let rows = vec![row("total", 10), row("total", 20)];
        let summary = data_summary(&rows);
        assert!(summary.starts_with("Dados encontrados (2 linhas):"));
        assert!(summary.contains("\"total\":10"));
        assert!(!summary.contains("e mais"));
    }

    #[test]
    fn data_summary_truncates_after_ten_rows() {
        let rows: Vec<Row> = (0..12).map(|i| row("n", i)).collect();
        let summary = data_summary(&rows);
        assert!(summary.starts_with("Dados encontrados (12 linhas):"));
        assert!(summary.contains("... e mais 2 linhas"));
        assert!(summary.contains("\"n\":9"));
        assert!(!summary.contains("\"n\":10"));
    }

    #[test]
    fn tool_context_prompt_keeps_fallback_instructions() {
        let prompt = tool_context_prompt("get_tipo('x'): nada", "sc", "sb");
        assert!(prompt.contains("get_tipo('x'): nada"));
        assert!(prompt.contains("NUNCA retorne []"));
        assert!(prompt.contains("datario.adm_central_atendimento_1746.chamado"));
    }
}
