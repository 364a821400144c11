use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::Serialize;

use crate::schema::*;
use crate::utils::decimal::serialize_amount;

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = setores)]
pub struct Sector {
    pub id: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = setores)]
pub struct NewSector {
    pub id: String,
    pub nome: String,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = clientes)]
#[diesel(belongs_to(Sector, foreign_key = setor_id))]
pub struct Client {
    pub id: String,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub status: String,
    pub setor_id: Option<String>,
    pub observacoes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = clientes)]
pub struct NewClient {
    pub id: String,
    pub nome: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub whatsapp: Option<String>,
    pub cpf_cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub status: String,
    pub setor_id: Option<String>,
    pub observacoes: Option<String>,
}

/// A legal case (`processos` row).
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = processos)]
#[diesel(belongs_to(Client, foreign_key = cliente_id))]
pub struct LegalCase {
    pub id: String,
    pub cliente_id: String,
    pub numero_processo: String,
    pub status: String,
    pub vara: Option<String>,
    pub comarca: Option<String>,
    pub descricao: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = processos)]
pub struct NewLegalCase {
    pub id: String,
    pub cliente_id: String,
    pub numero_processo: String,
    pub status: String,
    pub vara: Option<String>,
    pub comarca: Option<String>,
    pub descricao: Option<String>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = documentos)]
#[diesel(belongs_to(Client, foreign_key = cliente_id))]
pub struct Document {
    pub id: String,
    pub cliente_id: String,
    pub titulo: String,
    pub categoria: Option<String>,
    pub url_arquivo: Option<String>,
    pub nome_arquivo: Option<String>,
    pub tamanho_arquivo: Option<i64>,
    pub tipo_mime: Option<String>,
    pub descricao: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documentos)]
pub struct NewDocument {
    pub id: String,
    pub cliente_id: String,
    pub titulo: String,
    pub categoria: Option<String>,
    pub url_arquivo: Option<String>,
    pub nome_arquivo: Option<String>,
    pub tamanho_arquivo: Option<i64>,
    pub tipo_mime: Option<String>,
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = conversas)]
#[diesel(belongs_to(Client, foreign_key = cliente_id))]
pub struct Conversation {
    pub id: String,
    pub cliente_id: String,
    pub assunto: Option<String>,
    pub resumo: Option<String>,
    pub ultima_mensagem: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversas)]
pub struct NewConversation {
    pub id: String,
    pub cliente_id: String,
    pub assunto: Option<String>,
    pub resumo: Option<String>,
    pub ultima_mensagem: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = mensagens)]
#[diesel(belongs_to(Conversation, foreign_key = conversa_id))]
pub struct Message {
    pub id: String,
    pub conversa_id: String,
    pub tipo_remetente: Option<String>,
    pub nome_remetente: Option<String>,
    pub conteudo: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = mensagens)]
pub struct NewMessage {
    pub id: String,
    pub conversa_id: String,
    pub tipo_remetente: Option<String>,
    pub nome_remetente: Option<String>,
    pub conteudo: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = contatos)]
#[diesel(belongs_to(Client, foreign_key = cliente_id))]
pub struct Contact {
    pub id: String,
    pub cliente_id: String,
    pub tipo: Option<String>,
    pub label: Option<String>,
    pub valor: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contatos)]
pub struct NewContact {
    pub id: String,
    pub cliente_id: String,
    pub tipo: Option<String>,
    pub label: Option<String>,
    pub valor: Option<String>,
}

/// `valor` is stored with NUMERIC affinity and surfaced as a two-place decimal string.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Serialize)]
#[diesel(table_name = faturas)]
#[diesel(belongs_to(Client, foreign_key = cliente_id))]
pub struct Invoice {
    pub id: String,
    pub cliente_id: String,
    pub numero_fatura: String,
    pub descricao: Option<String>,
    #[serde(serialize_with = "serialize_amount")]
    pub valor: Option<f64>,
    pub status: String,
    pub data_vencimento: Option<NaiveDate>,
    pub data_pagamento: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = faturas)]
pub struct NewInvoice {
    pub id: String,
    pub cliente_id: String,
    pub numero_fatura: String,
    pub descricao: Option<String>,
    pub valor: Option<f64>,
    pub status: String,
    pub data_vencimento: Option<NaiveDate>,
    pub data_pagamento: Option<NaiveDate>,
}

/// Append-only audit entry (`atividades` row).
#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = atividades)]
pub struct Activity {
    pub id: String,
    pub usuario_id: Option<String>,
    pub acao: Option<String>,
    pub descricao: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = atividades)]
pub struct NewActivity {
    pub id: String,
    pub usuario_id: Option<String>,
    pub acao: Option<String>,
    pub descricao: Option<String>,
}
