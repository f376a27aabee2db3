use crate::annotations::{GeneId, Genes};
use crate::bins::{BinChildren, BinCode, BinId};
use crate::DEFAULT_NUM_CHILDREN;

#[derive(Debug)]
pub(crate) struct BinInternal {
    id: BinId,
    code: BinCode,
    name: String,
    annotation: Option<String>,
    description: String,
    parent: Option<BinId>,
    children: BinChildren,
    genes: Genes,
    placeholder: bool,
}

impl BinInternal {
    pub fn new(
        id: BinId,
        code: BinCode,
        name: &str,
        annotation: &str,
        description: &str,
        parent: Option<BinId>,
    ) -> BinInternal {
        BinInternal {
            id,
            code,
            name: name.to_string(),
            annotation: (!annotation.is_empty()).then(|| annotation.to_string()),
            description: description.to_string(),
            parent,
            children: BinChildren::with_capacity(DEFAULT_NUM_CHILDREN),
            genes: Genes::default(),
            placeholder: false,
        }
    }

    /// Creates an ancestor bin that is only known from the code of a descendant
    pub fn placeholder(id: BinId, code: BinCode, parent: Option<BinId>) -> BinInternal {
        let name = code.to_string();
        let mut bin = BinInternal::new(id, code, &name, "", "", parent);
        bin.placeholder = true;
        bin
    }

    pub fn root() -> BinInternal {
        BinInternal::new(BinId::root(), BinCode::root(), "root", "root", "root", None)
    }

    pub fn id(&self) -> BinId {
        self.id
    }

    pub fn code(&self) -> &BinCode {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent(&self) -> Option<BinId> {
        self.parent
    }

    pub fn children(&self) -> &BinChildren {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut BinChildren {
        &mut self.children
    }

    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn add_child(&mut self, child: BinId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn add_gene(&mut self, gene: GeneId) -> bool {
        self.genes.insert(gene)
    }

    /// Replaces the placeholder metadata with the values of a real mapping row
    pub fn backfill(&mut self, name: &str, annotation: &str, description: &str) {
        self.name = name.to_string();
        self.annotation = (!annotation.is_empty()).then(|| annotation.to_string());
        self.description = description.to_string();
        self.placeholder = false;
    }
}

impl PartialEq for BinInternal {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BinInternal {}
