// Every identifier interpolated into SQL comes from a &'static value here

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::Function => "FUNCTION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutineSpec {
    pub name: &'static str,
    pub kind: RoutineKind,
}

// Every row returned is a child whose parent is gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegrityRule {
    pub label: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub tables: &'static [TableSpec],
    pub routines: &'static [RoutineSpec],
    pub probe: RoutineSpec,
    pub create_order: RoutineSpec,
    pub add_item: RoutineSpec,
    pub integrity_rules: &'static [IntegrityRule],
}

pub const CLIENTES: TableSpec = TableSpec {
    name: "clientes",
    columns: &["id", "nome", "email"],
};

pub const PRODUTOS: TableSpec = TableSpec {
    name: "produtos",
    columns: &["id", "nome", "preco", "estoque"],
};

pub const PEDIDOS: TableSpec = TableSpec {
    name: "pedidos",
    columns: &["id", "cliente_id", "data_pedido"],
};

pub const ITENS_PEDIDO: TableSpec = TableSpec {
    name: "itens_pedido",
    columns: &["id", "pedido_id", "produto_id", "quantidade"],
};

pub const CRIAR_PEDIDO: RoutineSpec = RoutineSpec {
    name: "criar_pedido",
    kind: RoutineKind::Procedure,
};

pub const ADICIONAR_ITEM: RoutineSpec = RoutineSpec {
    name: "adicionar_item",
    kind: RoutineKind::Procedure,
};

pub const CALCULAR_TOTAL_PEDIDO: RoutineSpec = RoutineSpec {
    name: "calcular_total_pedido",
    kind: RoutineKind::Function,
};

pub const LOJA_TABLES: &[TableSpec] = &[CLIENTES, PRODUTOS, PEDIDOS, ITENS_PEDIDO];

pub const LOJA_ROUTINES: &[RoutineSpec] = &[CRIAR_PEDIDO, ADICIONAR_ITEM, CALCULAR_TOTAL_PEDIDO];

pub const LOJA_INTEGRITY_RULES: &[IntegrityRule] = &[
    IntegrityRule {
        label: "cliente_id em pedidos",
        sql: "SELECT p.id AS pedido_id, p.cliente_id, c.id AS cliente_existente
              FROM pedidos p LEFT JOIN clientes c ON p.cliente_id = c.id
              WHERE c.id IS NULL",
    },
    IntegrityRule {
        label: "pedido_id em itens_pedido",
        sql: "SELECT i.id AS item_id, i.pedido_id, p.id AS pedido_existente
              FROM itens_pedido i LEFT JOIN pedidos p ON i.pedido_id = p.id
              WHERE p.id IS NULL",
    },
    IntegrityRule {
        label: "produto_id em itens_pedido",
        sql: "SELECT i.id AS item_id, i.produto_id, pr.id AS produto_existente
              FROM itens_pedido i LEFT JOIN produtos pr ON i.produto_id = pr.id
              WHERE pr.id IS NULL",
    },
];

impl Catalog {
    pub fn loja() -> Self {
        Self {
            tables: LOJA_TABLES,
            routines: LOJA_ROUTINES,
            probe: CALCULAR_TOTAL_PEDIDO,
            create_order: CRIAR_PEDIDO,
            add_item: ADICIONAR_ITEM,
            integrity_rules: LOJA_INTEGRITY_RULES,
        }
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
