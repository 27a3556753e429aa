use lazy_static::lazy_static;
use std::collections::HashSet;

/// English stopwords, lower-case surface forms. Contractions appear as the
/// fragments the tokenizer leaves behind ("don't" → "don", "t").
pub const ENGLISH: &[&str] = &[
    "a", "able", "about", "above", "abroad", "according", "accordingly", "across", "actually", "adj",
    "after", "afterwards", "again", "against", "ago", "ahead", "ain", "all", "allow", "allows",
    "almost", "alone", "along", "alongside", "already", "also", "although", "always", "am", "amid",
    "amidst", "among", "amongst", "an", "and", "another", "any", "anybody", "anyhow", "anyone",
    "anything", "anyway", "anyways", "anywhere", "apart", "appear", "appreciate", "appropriate", "are", "aren",
    "around", "as", "aside", "ask", "asking", "associated", "at", "available", "away", "awfully",
    "b", "back", "backward", "backwards", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "begin", "behind", "being", "believe", "below", "beside", "besides",
    "best", "better", "between", "beyond", "both", "brief", "but", "by",
    "c", "came", "can", "cannot", "cant", "caption", "cause", "causes", "certain", "certainly",
    "changes", "clearly", "cmon", "co", "com", "come", "comes", "concerning", "consequently", "consider",
    "considering", "contain", "containing", "contains", "corresponding", "could", "couldn", "course", "currently",
    "d", "dare", "daren", "definitely", "described", "despite", "did", "didn", "different", "directly",
    "do", "does", "doesn", "doing", "don", "done", "down", "downwards", "during",
    "e", "each", "edu", "eg", "eight", "eighty", "either", "else", "elsewhere", "end",
    "ending", "enough", "entirely", "especially", "et", "etc", "even", "ever", "evermore", "every",
    "everybody", "everyone", "everything", "everywhere", "ex", "exactly", "example", "except",
    "f", "fairly", "far", "farther", "few", "fewer", "fifth", "first", "five", "followed",
    "following", "follows", "for", "forever", "former", "formerly", "forth", "forward", "found", "four",
    "from", "further", "furthermore",
    "g", "get", "gets", "getting", "given", "gives", "go", "goes", "going", "gone",
    "got", "gotten", "greetings",
    "h", "had", "hadn", "half", "happens", "hardly", "has", "hasn", "have", "haven",
    "having", "he", "hello", "help", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hereupon", "hers", "herself", "hi", "him", "himself", "his", "hither", "hopefully", "how",
    "howbeit", "however", "hundred",
    "i", "ie", "if", "ignored", "immediate", "in", "inasmuch", "inc", "indeed", "indicate",
    "indicated", "indicates", "inner", "inside", "insofar", "instead", "into", "inward", "is", "isn",
    "it", "its", "itself",
    "j", "just",
    "k", "keep", "keeps", "kept", "know", "known", "knows",
    "l", "last", "lately", "later", "latter", "latterly", "least", "less", "lest", "let",
    "like", "liked", "likely", "likewise", "little", "ll", "look", "looking", "looks", "low",
    "lower", "ltd",
    "m", "made", "mainly", "make", "makes", "many", "may", "maybe", "mayn", "me",
    "mean", "meantime", "meanwhile", "merely", "might", "mightn", "mine", "minus", "miss", "more",
    "moreover", "most", "mostly", "mr", "mrs", "much", "must", "mustn", "my", "myself",
    "n", "name", "namely", "nd", "near", "nearly", "necessary", "need", "needn", "needs",
    "neither", "never", "neverf", "neverless", "nevertheless", "new", "next", "nine", "ninety", "no",
    "nobody", "non", "none", "nonetheless", "noone", "nor", "normally", "not", "nothing", "notwithstanding",
    "novel", "now", "nowhere",
    "o", "obviously", "of", "off", "often", "oh", "ok", "okay", "old", "on",
    "once", "one", "ones", "only", "onto", "opposite", "or", "other", "others", "otherwise",
    "ought", "oughtn", "our", "ours", "ourselves", "out", "outside", "over", "overall", "own",
    "p", "particular", "particularly", "past", "per", "perhaps", "placed", "please", "plus", "possible",
    "presumably", "probably", "provided", "provides",
    "q", "que", "quite", "qv",
    "r", "rather", "rd", "re", "really", "reasonably", "recent", "recently", "regarding", "regardless",
    "regards", "relatively", "respectively", "right", "round",
    "s", "said", "same", "saw", "say", "saying", "says", "second", "secondly", "see",
    "seeing", "seem", "seemed", "seeming", "seems", "seen", "self", "selves", "sensible", "sent",
    "serious", "seriously", "seven", "several", "shall", "shan", "she", "should", "shouldn", "since",
    "six", "so", "some", "somebody", "someday", "somehow", "someone", "something", "sometime", "sometimes",
    "somewhat", "somewhere", "soon", "sorry", "specified", "specify", "specifying", "still", "sub", "such",
    "sup", "sure",
    "t", "take", "taken", "taking", "tell", "tends", "th", "than", "thank", "thanks",
    "thanx", "that", "thats", "the", "their", "theirs", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "theres", "thereupon", "these", "they", "thing",
    "things", "think", "third", "thirty", "this", "thorough", "thoroughly", "those", "though", "three",
    "through", "throughout", "thru", "thus", "till", "to", "together", "too", "took", "toward",
    "towards", "tried", "tries", "truly", "try", "trying", "twice", "two",
    "u", "un", "under", "underneath", "undoing", "unfortunately", "unless", "unlike", "unlikely", "until",
    "unto", "up", "upon", "upwards", "us", "use", "used", "useful", "uses", "using",
    "usually",
    "v", "value", "various", "ve", "versus", "very", "via", "viz", "vs",
    "w", "want", "wants", "was", "wasn", "way", "we", "welcome", "well", "went",
    "were", "weren", "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "whichever", "while", "whilst", "whither",
    "who", "whoever", "whole", "whom", "whomever", "whose", "why", "will", "willing", "wish",
    "with", "within", "without", "won", "wonder", "would", "wouldn",
    "x",
    "y", "yes", "yet", "you", "your", "yours", "yourself", "yourselves",
    "z", "zero",
    // Web boilerplate that survives text extraction on most pages.
    "abstract", "account", "add", "address", "ad", "ads", "archive", "archives", "article", "articles",
    "blog", "click", "comment", "comments", "contact", "content", "copyright", "cookie", "cookies",
    "day", "days", "email", "facebook", "faq", "free", "home", "html", "http", "https",
    "info", "link", "links", "log", "login", "menu", "net", "news",
    "org", "page", "pages", "post", "posted", "posts", "previous", "privacy", "read", "reply",
    "reserved", "rights", "search", "share", "sign", "site", "subscribe", "terms", "top", "twitter",
    "www", "year", "years",
];

lazy_static! {
    pub static ref STOPWORDS: HashSet<&'static str> = ENGLISH.iter().copied().collect();
}

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }
