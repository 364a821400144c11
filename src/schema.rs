// Mirrors the DDL in `db.rs`; table and column names are the persisted layout.

diesel::table! {
    users (id) {
        id -> Text,
        username -> Text,
        password -> Text,
        email -> Nullable<Text>,
        role -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    setores (id) {
        id -> Text,
        nome -> Text,
        descricao -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    clientes (id) {
        id -> Text,
        nome -> Text,
        email -> Nullable<Text>,
        telefone -> Nullable<Text>,
        whatsapp -> Nullable<Text>,
        cpf_cnpj -> Nullable<Text>,
        endereco -> Nullable<Text>,
        cidade -> Nullable<Text>,
        estado -> Nullable<Text>,
        cep -> Nullable<Text>,
        status -> Text,
        setor_id -> Nullable<Text>,
        observacoes -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    processos (id) {
        id -> Text,
        cliente_id -> Text,
        numero_processo -> Text,
        status -> Text,
        vara -> Nullable<Text>,
        comarca -> Nullable<Text>,
        descricao -> Nullable<Text>,
        data_inicio -> Nullable<Date>,
        data_fim -> Nullable<Date>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    documentos (id) {
        id -> Text,
        cliente_id -> Text,
        titulo -> Text,
        categoria -> Nullable<Text>,
        url_arquivo -> Nullable<Text>,
        nome_arquivo -> Nullable<Text>,
        tamanho_arquivo -> Nullable<BigInt>,
        tipo_mime -> Nullable<Text>,
        descricao -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    conversas (id) {
        id -> Text,
        cliente_id -> Text,
        assunto -> Nullable<Text>,
        resumo -> Nullable<Text>,
        ultima_mensagem -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    mensagens (id) {
        id -> Text,
        conversa_id -> Text,
        tipo_remetente -> Nullable<Text>,
        nome_remetente -> Nullable<Text>,
        conteudo -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    contatos (id) {
        id -> Text,
        cliente_id -> Text,
        tipo -> Nullable<Text>,
        label -> Nullable<Text>,
        valor -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    faturas (id) {
        id -> Text,
        cliente_id -> Text,
        numero_fatura -> Text,
        descricao -> Nullable<Text>,
        valor -> Nullable<Double>,
        status -> Text,
        data_vencimento -> Nullable<Date>,
        data_pagamento -> Nullable<Date>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    atividades (id) {
        id -> Text,
        usuario_id -> Nullable<Text>,
        acao -> Nullable<Text>,
        descricao -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::joinable!(atividades -> users (usuario_id));
diesel::joinable!(clientes -> setores (setor_id));
diesel::joinable!(contatos -> clientes (cliente_id));
diesel::joinable!(conversas -> clientes (cliente_id));
diesel::joinable!(documentos -> clientes (cliente_id));
diesel::joinable!(faturas -> clientes (cliente_id));
diesel::joinable!(mensagens -> conversas (conversa_id));
diesel::joinable!(processos -> clientes (cliente_id));

diesel::allow_tables_to_appear_in_same_query!(
    atividades, clientes, contatos, conversas, documentos, faturas, mensagens, processos, setores,
    users,
);
