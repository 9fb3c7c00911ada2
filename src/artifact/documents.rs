use std::collections::{HashMap, HashSet};

use super::{GraphDocument, LinkRecord, NodeKind, NodeRecord};
use crate::centrality::CentralityScores;
use crate::graph::{BipartiteView, CitationView, CoauthorView};
use crate::ingest::{Paper, PaperTable};

/// Paper node carrying the attributes stored on the paper table
pub fn paper_node(paper: &Paper) -> NodeRecord {
    let mut node = NodeRecord::new(&paper.id, &paper.title, NodeKind::Paper);
    node.category = Some(paper.display_category().to_string());
    node.year = Some(paper.year);
    node.pagerank = Some(paper.pagerank);
    node.citation_count = Some(paper.citation_count);
    node
}

/// Co-author document; `scores` are indexed like `view.authors`
pub fn coauthor_document(view: &CoauthorView, scores: &CentralityScores) -> GraphDocument {
    let nodes = view
        .authors
        .iter()
        .enumerate()
        .map(|(idx, author)| {
            let mut node = NodeRecord::new(&author.id, &author.name, NodeKind::Author);
            node.category = Some(author.dominant_category().to_string());
            node.paper_count = Some(author.paper_count);
            node.coauthor_count = Some(author.coauthor_count);
            node.pagerank = scores.pagerank_of(idx);
            node.degree = scores.degree_of(idx);
            node.betweenness = scores.betweenness_of(idx);
            node.closeness = scores.closeness_of(idx);
            node
        })
        .collect();

    let links = view
        .edges
        .iter()
        .map(|edge| {
            let mut link = LinkRecord::new(&edge.source, &edge.target);
            link.weight = Some(edge.weight);
            link.papers = Some(edge.papers.clone());
            link.titles = Some(edge.titles.clone());
            link.category = Some(edge.category.to_string());
            link
        })
        .collect();

    GraphDocument { nodes, links }
}

/// Citation document; `scores` are indexed by table position
pub fn citation_document(
    table: &PaperTable,
    view: &CitationView,
    scores: &CentralityScores,
) -> GraphDocument {
    let nodes = table
        .iter()
        .enumerate()
        .map(|(pos, paper)| {
            let mut node = paper_node(paper);
            node.citation_count = Some(view.citation_counts[pos]);
            if let Some(rank) = scores.pagerank_of(pos) {
                node.pagerank = Some(rank);
            }
            node.degree = scores.degree_of(pos);
            node.betweenness = scores.betweenness_of(pos);
            node.closeness = scores.closeness_of(pos);
            node
        })
        .collect();

    let papers = table.papers();
    let links = view
        .edges
        .iter()
        .map(|&(cited, citing)| LinkRecord::new(&papers[cited].id, &papers[citing].id))
        .collect();

    GraphDocument { nodes, links }
}

/// Author–paper document: paper nodes, then author nodes, then author → paper links.
/// `pagerank` holds scores by node id; ids without a score get 0.
pub fn bipartite_document(
    table: &PaperTable,
    view: &BipartiteView,
    pagerank: &HashMap<String, f64>,
) -> GraphDocument {
    let papers = table.papers();
    let rank_of = |id: &str| Some(pagerank.get(id).copied().unwrap_or(0.0));

    let mut nodes: Vec<NodeRecord> = view
        .papers
        .iter()
        .map(|&pos| {
            let paper = &papers[pos];
            let mut node = paper_node(paper);
            node.pagerank = rank_of(&paper.id);
            node.author_list = Some(paper.authors.clone());
            node
        })
        .collect();

    nodes.extend(view.authors.iter().map(|author| {
        let mut node = NodeRecord::new(&author.id, &author.name, NodeKind::Author);
        node.paper_count = Some(author.paper_count);
        node.coauthor_count = Some(author.coauthor_count);
        node.pagerank = rank_of(&author.id);
        node
    }));

    let links = view
        .edges
        .iter()
        .map(|&(a, pos)| {
            let mut link = LinkRecord::new(&view.authors[a].id, &papers[pos].id);
            link.weight = Some(1);
            link
        })
        .collect();

    GraphDocument { nodes, links }
}

/// Keep the `top` nodes with the highest PageRank (missing ranks count as 0)
/// and the links whose endpoints both survive
pub fn sample_document(doc: &GraphDocument, top: usize) -> GraphDocument {
    let mut order: Vec<usize> = (0..doc.nodes.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = doc.nodes[a].pagerank.unwrap_or(0.0);
        let rb = doc.nodes[b].pagerank.unwrap_or(0.0);
        rb.total_cmp(&ra)
    });
    order.truncate(top);

    let nodes: Vec<NodeRecord> = order.iter().map(|&i| doc.nodes[i].clone()).collect();
    let kept: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    let links = doc
        .links
        .iter()
        .filter(|l| kept.contains(l.source.as_str()) && kept.contains(l.target.as_str()))
        .cloned()
        .collect();

    GraphDocument { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::{CentralityEngine, Metric};

    fn paper(id: &str, authors: &[&str], cats: &[&str], cites: &[&str]) -> Paper {
        let mut p = Paper::new(id, 2007);
        p.title = format!("Title {}", id);
        p.authors = authors.iter().map(|a| a.to_string()).collect();
        p.categories = cats.iter().map(|c| c.to_string()).collect();
        p.citations = cites.iter().map(|c| c.to_string()).collect();
        p
    }

    fn fixture() -> PaperTable {
        PaperTable::from_papers(vec![
            paper("P1", &["Ann Lee", "Bob Ray"], &["cs.LG"], &["P2"]),
            paper("P2", &["Bob Ray"], &["hep-th"], &["P3"]),
            paper("P3", &["Cy Dunn"], &[], &[]),
        ])
    }

    #[test]
    fn test_citation_document_orientation_and_sink_rank() {
        let table = fixture();
        let view = CitationView::build(&table);
        let scores = CentralityEngine::default().compute(&view.graph(&table), &[Metric::PageRank, Metric::Degree]);
        let doc = citation_document(&table, &view, &scores);

        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.links[0], LinkRecord::new("P2", "P1"));
        assert_eq!(doc.nodes[2].category.as_deref(), Some("Other"));
        assert_eq!(doc.nodes[1].citation_count, Some(1));
        assert!(doc.nodes[2].pagerank > doc.nodes[0].pagerank);
        assert!(doc.nodes[0].betweenness.is_none());
    }

    #[test]
    fn test_coauthor_document() {
        let view = CoauthorView::build(&fixture());
        let scores = CentralityEngine::default().compute(&view.graph(), &Metric::ALL);
        let doc = coauthor_document(&view, &scores);

        assert_eq!(doc.nodes.len(), 3);
        let cy = doc.nodes.iter().find(|n| n.id == "author:Cy Dunn").unwrap();
        assert_eq!(cy.degree, Some(0));
        assert_eq!(cy.closeness, Some(0.0));
        assert_eq!(cy.betweenness, Some(0.0));
        assert_eq!(doc.links.len(), 1);
        assert_eq!(doc.links[0].weight, Some(1));
        assert_eq!(doc.links[0].category.as_deref(), Some("Computer Science"));
    }

    #[test]
    fn test_bipartite_document_orders_papers_first() {
        let table = fixture();
        let view = BipartiteView::build(&table);
        let ranks = HashMap::from([("author:Bob Ray".to_string(), 0.5)]);
        let doc = bipartite_document(&table, &view, &ranks);

        let kinds: Vec<NodeKind> = doc.nodes.iter().map(|n| n.kind).collect();
        assert_eq!(kinds[..3], [NodeKind::Paper; 3]);
        assert_eq!(kinds[3..], [NodeKind::Author; 3]);
        assert_eq!(doc.nodes[0].author_list, Some(vec!["Ann Lee".to_string(), "Bob Ray".to_string()]));
        assert_eq!(doc.nodes[4].pagerank, Some(0.5));
        assert_eq!(doc.nodes[0].pagerank, Some(0.0));
        assert_eq!(doc.links.len(), 4);
    }

    #[test]
    fn test_sample_keeps_top_nodes_and_internal_links() {
        let mut doc = GraphDocument::default();
        for (id, rank) in [("a", 0.1), ("b", 0.5), ("c", 0.4), ("d", 0.4)] {
            let mut node = NodeRecord::new(id, id, NodeKind::Paper);
            node.pagerank = Some(rank);
            doc.nodes.push(node);
        }
        doc.links.push(LinkRecord::new("b", "c"));
        doc.links.push(LinkRecord::new("a", "b"));

        let sample = sample_document(&doc, 3);
        let ids: Vec<&str> = sample.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
        assert_eq!(sample.links, vec![LinkRecord::new("b", "c")]);
    }
}
